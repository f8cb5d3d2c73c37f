use engine::indicators::{bollinger, ema, macd, obv, rsi, sma, stdev, volume_profile, TrendInputs, TrendSignal};
use engine::{EngineError, IndicatorConfig, IndicatorEngine};
use shared::models::{Bar, VolumeSource};

fn wave(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let x = i as f64;
            100.0 + (x * 0.37).sin() * 4.0 + (x * 0.11).cos() * 2.5 + x * 0.02
        })
        .collect()
}

fn bars_from(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            start_time: 1_700_000_000_000 + i as i64 * 900_000,
            open: close,
            high: close * 1.004,
            low: close * 0.996,
            close,
            volume: 5.0 + (i % 7) as f64,
            turnover: Some(close * (5.0 + (i % 7) as f64)),
        })
        .collect()
}

#[test]
fn ema_is_seeded_with_the_first_value() {
    let values = wave(40);
    for period in [2, 9, 21, 50] {
        assert_eq!(ema(&values, period)[0], values[0]);
    }
}

#[test]
fn ema_of_constant_input_is_constant() {
    let values = vec![1234.5678; 300];
    for period in [9, 21, 200] {
        assert!(ema(&values, period).iter().all(|v| *v == 1234.5678));
    }
}

#[test]
fn sma_and_stdev_warm_up() {
    let values = wave(50);
    let period = 20;
    let s = sma(&values, period);
    let d = stdev(&values, period);
    for i in 0..values.len() {
        assert_eq!(s[i].is_some(), i + 1 >= period, "sma index {}", i);
        assert_eq!(d[i].is_some(), i + 1 >= period, "stdev index {}", i);
    }

    let flat = stdev(&[3.0; 50], period);
    assert!(flat.iter().flatten().all(|v| *v == 0.0));
}

#[test]
fn rsi_stays_within_bounds() {
    let values = wave(250);
    let out = rsi(&values, 14);
    assert_eq!(out.len(), values.len());
    assert!(out[..15].iter().all(Option::is_none));
    assert!(out[15..].iter().all(|v| matches!(v, Some(x) if (0.0..=100.0).contains(x))));
}

#[test]
fn rsi_of_rising_prices_is_100() {
    let values: Vec<f64> = (0..60).map(|i| 50.0 + i as f64 * 0.25).collect();
    assert!(rsi(&values, 14).iter().flatten().all(|v| *v == 100.0));
}

#[test]
fn macd_histogram_identity() {
    let m = macd(&wave(210), 12, 26, 9);
    assert_eq!(m.histogram.len(), 210);
    for i in 0..210 {
        assert_eq!(m.histogram[i], m.macd_line[i] - m.signal_line[i]);
    }
}

#[test]
fn obv_accumulates_by_direction() {
    let out = obv(&[10.0, 12.0, 11.0, 11.0, 13.0], &[5.0, 7.0, 3.0, 9.0, 2.0]);
    assert_eq!(out, vec![0.0, 7.0, 4.0, 4.0, 6.0]);
}

#[test]
fn bollinger_is_undefined_until_basis_and_sd_exist() {
    let bb = bollinger(&wave(30), 20, 2.0);
    for i in 0..30 {
        assert_eq!(bb.upper[i].is_some(), i >= 19);
        if let (Some(u), Some(b), Some(l)) = (bb.upper[i], bb.basis[i], bb.lower[i]) {
            assert!(u >= b && b >= l);
        }
    }
}

#[test]
fn clustered_volume_forms_the_poc() {
    let mut bars = vec![Bar {
        start_time: 0,
        open: 90.0,
        high: 130.0,
        low: 70.0,
        close: 90.0,
        volume: 0.0,
        turnover: None,
    }];
    // range 70..130 over 24 bins: step 2.5, bucket 12 spans 100..102.5
    for i in 1..=5 {
        bars.push(Bar {
            start_time: i,
            open: 101.0,
            high: 101.2,
            low: 100.8,
            close: 101.0,
            volume: i as f64,
            turnover: None,
        });
    }
    let vp = volume_profile(&bars, 24, VolumeSource::Base);
    let poc = vp.poc.expect("poc");
    assert_eq!(poc.volume, 15.0);
    assert!((poc.price - 101.25).abs() < 1e-9);
}

#[test]
fn trend_classification_boundaries() {
    let classify = |ema_fast, ema_slow, macd_histogram, rsi| {
        TrendSignal::classify(&TrendInputs {
            ema_fast,
            ema_slow,
            macd_histogram,
            rsi: Some(rsi),
        })
    };
    assert_eq!(classify(101.0, 100.0, 0.5, 60.0), TrendSignal::Bullish);
    assert_eq!(classify(99.0, 100.0, -0.1, 40.0), TrendSignal::Bearish);
    assert_eq!(classify(100.0, 100.0, 0.0, 50.0), TrendSignal::Neutral);
}

#[test]
fn engine_is_deterministic() {
    let bars = bars_from(&wave(210));
    let engine = IndicatorEngine::default();
    let first = engine.compute(&bars).unwrap();
    let second = engine.compute(&bars).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), bars.len());
}

#[test]
fn empty_input_is_rejected() {
    assert!(matches!(
        IndicatorEngine::default().compute(&[]),
        Err(EngineError::InsufficientData { .. })
    ));
}

#[test]
fn latest_values_are_defined_after_warm_up() {
    let config = IndicatorConfig::default();
    let bars = bars_from(&wave(config.warmup_bars()));
    let report = IndicatorEngine::new(config).unwrap().compute(&bars).unwrap();
    assert!(report.latest.rsi.is_some());
    assert!(report.latest.bollinger_upper.is_some());
    assert_eq!(report.latest.close, bars[bars.len() - 1].close);
}

#[test]
fn quote_volume_source_reads_turnover() {
    let bars = bars_from(&wave(60));
    let base = IndicatorEngine::default().compute(&bars).unwrap();
    let quote_cfg = IndicatorConfig {
        volume_source: VolumeSource::Quote,
        ..IndicatorConfig::default()
    };
    let quote = IndicatorEngine::new(quote_cfg).unwrap().compute(&bars).unwrap();
    assert_eq!(base.ema_fast, quote.ema_fast);

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let turnovers: Vec<f64> = bars.iter().filter_map(|b| b.turnover).collect();
    assert_eq!(quote.obv, obv(&closes, &turnovers));
    assert_ne!(quote.obv, base.obv);
}
