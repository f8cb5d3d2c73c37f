// Coarse volume profile: bar volume distributed over equal-width price buckets
use serde::Serialize;
use shared::models::{Bar, VolumeSource};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceLevel {
    pub price: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeProfile {
    /// Point of control: the bucket holding the most volume.
    pub poc: Option<PriceLevel>,
    /// Up to three highest-volume buckets, ordered by price ascending.
    pub top_nodes: Vec<PriceLevel>,
}

impl VolumeProfile {
    fn empty() -> Self {
        VolumeProfile {
            poc: None,
            top_nodes: Vec::new(),
        }
    }
}

const TOP_NODES: usize = 3;

/// Buckets every bar's typical price between the lowest low and the highest
/// high and sums the bar's volume into that bucket. A flat range uses a step of
/// 1 so every bar lands in the first bucket.
pub fn volume_profile(bars: &[Bar], bins: usize, source: VolumeSource) -> VolumeProfile {
    if bars.is_empty() || bins == 0 {
        return VolumeProfile::empty();
    }

    let min_price = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let max_price = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let mut step = (max_price - min_price) / bins as f64;
    if step == 0.0 || !step.is_finite() {
        step = 1.0;
    }

    let last = (bins - 1) as f64;
    let mut volumes = vec![0.0; bins];
    for bar in bars {
        let slot = ((bar.typical_price() - min_price) / step).floor().max(0.0).min(last);
        volumes[slot as usize] += bar.volume_in(source);
    }

    let mut levels: Vec<PriceLevel> = volumes
        .into_iter()
        .enumerate()
        .map(|(idx, volume)| PriceLevel {
            price: min_price + step * (idx as f64 + 0.5),
            volume,
        })
        .collect();
    // stable: equal volumes keep the lower price first
    levels.sort_by(|a, b| b.volume.partial_cmp(&a.volume).unwrap_or(Ordering::Equal));

    let poc = levels.first().copied();
    let mut top_nodes: Vec<PriceLevel> = levels.into_iter().take(TOP_NODES).collect();
    top_nodes.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal));

    VolumeProfile { poc, top_nodes }
}
