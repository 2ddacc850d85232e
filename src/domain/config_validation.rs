//! Configuration validation.
//!
//! Every key is optional and falls back to the built-in default, except
//! `[backtest] codes`. Present values are range-checked before a run.

use crate::domain::backtest::BacktestConfig;
use crate::domain::capital::DEFAULT_STARTING_BALANCE;
use crate::domain::error::PullbackError;
use crate::domain::indicator::{DEFAULT_D_PERIOD, DEFAULT_K_PERIOD};
use crate::domain::indicator_set::{
    IndicatorConfig, DEFAULT_EMA_PERIODS, DEFAULT_RSI_PERIOD, DEFAULT_SMA_PERIODS,
};
use crate::domain::signal::{SignalConfig, DEFAULT_RSI_THRESHOLD, DEFAULT_STOCHASTIC_THRESHOLD};
use crate::domain::simulator::{
    SimulationConfig, DEFAULT_COMMISSION_RATE, DEFAULT_DRAWDOWN_THRESHOLD, DEFAULT_MAX_HOLD_DAYS,
};
use crate::domain::universe::parse_codes;
use crate::ports::config_port::ConfigPort;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), PullbackError> {
    read_codes(config)?;
    build_backtest_config(config)?;
    Ok(())
}

/// `[backtest] codes` as an ordered ticker list. Duplicates are rejected.
pub fn read_codes(config: &dyn ConfigPort) -> Result<Vec<String>, PullbackError> {
    match config.get_string("backtest", "codes") {
        Some(s) if !s.trim().is_empty() => {
            parse_codes(&s).map_err(|e| invalid("backtest", "codes", e.to_string()))
        }
        _ => Err(PullbackError::ConfigMissing {
            section: "backtest".to_string(),
            key: "codes".to_string(),
        }),
    }
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, PullbackError> {
    Ok(BacktestConfig {
        starting_balance: validate_starting_balance(config)?,
        simulation: SimulationConfig {
            commission_rate: validate_commission_rate(config)?,
            drawdown_threshold: validate_drawdown_threshold(config)?,
            max_hold_days: validate_period(config, "backtest", "max_hold_days", DEFAULT_MAX_HOLD_DAYS)?,
        },
        indicators: IndicatorConfig {
            ema_periods: validate_period_list(config, "ema_periods", &DEFAULT_EMA_PERIODS)?,
            sma_periods: validate_period_list(config, "sma_periods", &DEFAULT_SMA_PERIODS)?,
            rsi_period: validate_period(config, "indicators", "rsi_period", DEFAULT_RSI_PERIOD)?,
            stochastic_k: validate_period(config, "indicators", "stochastic_k", DEFAULT_K_PERIOD)?,
            stochastic_d: validate_period(config, "indicators", "stochastic_d", DEFAULT_D_PERIOD)?,
        },
        signal: SignalConfig {
            stochastic_threshold: validate_stochastic_threshold(config)?,
            rsi_threshold: validate_rsi_threshold(config)?,
        },
        parallel: config
            .get_bool("backtest", "parallel")
            .map_err(|e| invalid("backtest", "parallel", e))?
            .unwrap_or(false),
    })
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> PullbackError {
    PullbackError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn read_f64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, PullbackError> {
    let value = config
        .get_f64(section, key)
        .map_err(|e| invalid(section, key, e))?
        .unwrap_or(default);
    if !value.is_finite() {
        return Err(invalid(section, key, format!("{} must be finite", key)));
    }
    Ok(value)
}

fn validate_starting_balance(config: &dyn ConfigPort) -> Result<f64, PullbackError> {
    let value = read_f64(config, "backtest", "starting_balance", DEFAULT_STARTING_BALANCE)?;
    if value <= 0.0 {
        return Err(invalid(
            "backtest",
            "starting_balance",
            "starting_balance must be positive",
        ));
    }
    Ok(value)
}

fn validate_commission_rate(config: &dyn ConfigPort) -> Result<f64, PullbackError> {
    let value = read_f64(config, "backtest", "commission_rate", DEFAULT_COMMISSION_RATE)?;
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "backtest",
            "commission_rate",
            "commission_rate must be in [0, 1)",
        ));
    }
    Ok(value)
}

fn validate_drawdown_threshold(config: &dyn ConfigPort) -> Result<f64, PullbackError> {
    let value = read_f64(config, "backtest", "drawdown_threshold", DEFAULT_DRAWDOWN_THRESHOLD)?;
    if value <= 0.0 {
        return Err(invalid(
            "backtest",
            "drawdown_threshold",
            "drawdown_threshold must be positive",
        ));
    }
    Ok(value)
}

// %K is on a 0..1 scale, so any threshold of 1 or more passes every bar.
fn validate_stochastic_threshold(config: &dyn ConfigPort) -> Result<f64, PullbackError> {
    let value = read_f64(config, "signal", "stochastic_threshold", DEFAULT_STOCHASTIC_THRESHOLD)?;
    if value < 0.0 {
        return Err(invalid(
            "signal",
            "stochastic_threshold",
            "stochastic_threshold must not be negative",
        ));
    }
    Ok(value)
}

fn validate_rsi_threshold(config: &dyn ConfigPort) -> Result<f64, PullbackError> {
    let value = read_f64(config, "signal", "rsi_threshold", DEFAULT_RSI_THRESHOLD)?;
    if !(0.0..=100.0).contains(&value) {
        return Err(invalid(
            "signal",
            "rsi_threshold",
            "rsi_threshold must be between 0 and 100",
        ));
    }
    Ok(value)
}

fn validate_period(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, PullbackError> {
    let value = config
        .get_int(section, key)
        .map_err(|e| invalid(section, key, e))?
        .unwrap_or(default as i64);
    if value < 1 {
        return Err(invalid(section, key, format!("{} must be at least 1", key)));
    }
    Ok(value as usize)
}

fn validate_period_list(
    config: &dyn ConfigPort,
    key: &str,
    default: &[usize],
) -> Result<Vec<usize>, PullbackError> {
    let Some(items) = config.get_list("indicators", key) else {
        return Ok(default.to_vec());
    };

    let periods = items
        .iter()
        .map(|item| match item.parse::<usize>() {
            Ok(p) if p >= 1 => Ok(p),
            _ => Err(invalid(
                "indicators",
                key,
                format!("invalid period {:?}, expected a positive integer", item),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if periods.len() < 2 {
        return Err(invalid(
            "indicators",
            key,
            format!("{} needs at least two periods", key),
        ));
    }
    Ok(periods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_config_passes() {
        let config = make_config(
            r#"
[data]
directory = data

[backtest]
codes = LLY,UNH,JNJ
starting_balance = 10000
commission_rate = 0.01
drawdown_threshold = 0.05
max_hold_days = 10
parallel = true

[indicators]
ema_periods = 5,10,20
sma_periods = 20,50
rsi_period = 3
stochastic_k = 14
stochastic_d = 3

[signal]
stochastic_threshold = 20
rsi_threshold = 5
"#,
        );
        assert!(validate_backtest_config(&config).is_ok());

        let built = build_backtest_config(&config).unwrap();
        assert_eq!(built.starting_balance, 10000.0);
        assert_eq!(built.simulation.commission_rate, 0.01);
        assert_eq!(built.simulation.drawdown_threshold, 0.05);
        assert_eq!(built.simulation.max_hold_days, 10);
        assert_eq!(built.indicators.ema_periods, vec![5, 10, 20]);
        assert_eq!(built.indicators.sma_periods, vec![20, 50]);
        assert_eq!(built.indicators.rsi_period, 3);
        assert_eq!(built.indicators.stochastic_k, 14);
        assert_eq!(built.signal.stochastic_threshold, 20.0);
        assert_eq!(built.signal.rsi_threshold, 5.0);
        assert!(built.parallel);
    }

    #[test]
    fn absent_keys_use_defaults() {
        let config = make_config("[backtest]\ncodes = LLY\n");
        let built = build_backtest_config(&config).unwrap();
        assert_eq!(built, BacktestConfig::default());
    }

    #[test]
    fn codes_read_in_order() {
        let config = make_config("[backtest]\ncodes = unh, lly ,JNJ\n");
        assert_eq!(read_codes(&config).unwrap(), vec!["UNH", "LLY", "JNJ"]);
    }

    #[test]
    fn missing_codes_fails() {
        let config = make_config("[backtest]\nstarting_balance = 100\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, PullbackError::ConfigMissing { key, .. } if key == "codes"));
    }

    #[test]
    fn duplicate_codes_fails() {
        let config = make_config("[backtest]\ncodes = LLY,UNH,lly\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, PullbackError::ConfigInvalid { key, reason, .. } if key == "codes" && reason.contains("LLY"))
        );
    }

    #[test]
    fn empty_code_token_fails() {
        let config = make_config("[backtest]\ncodes = LLY,,UNH\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, PullbackError::ConfigInvalid { key, .. } if key == "codes"));
    }

    #[test]
    fn starting_balance_must_be_positive() {
        for value in ["0", "-100"] {
            let config = make_config(&format!(
                "[backtest]\ncodes = LLY\nstarting_balance = {}\n",
                value
            ));
            let err = validate_backtest_config(&config).unwrap_err();
            assert!(
                matches!(err, PullbackError::ConfigInvalid { key, .. } if key == "starting_balance")
            );
        }
    }

    #[test]
    fn commission_rate_out_of_range_fails() {
        for value in ["-0.01", "1.0", "2"] {
            let config = make_config(&format!(
                "[backtest]\ncodes = LLY\ncommission_rate = {}\n",
                value
            ));
            let err = validate_backtest_config(&config).unwrap_err();
            assert!(
                matches!(err, PullbackError::ConfigInvalid { key, .. } if key == "commission_rate")
            );
        }
    }

    #[test]
    fn zero_commission_allowed() {
        let config = make_config("[backtest]\ncodes = LLY\ncommission_rate = 0\n");
        assert_eq!(build_backtest_config(&config).unwrap().simulation.commission_rate, 0.0);
    }

    #[test]
    fn drawdown_threshold_must_be_positive() {
        let config = make_config("[backtest]\ncodes = LLY\ndrawdown_threshold = 0\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, PullbackError::ConfigInvalid { key, .. } if key == "drawdown_threshold")
        );
    }

    #[test]
    fn max_hold_days_zero_fails() {
        let config = make_config("[backtest]\ncodes = LLY\nmax_hold_days = 0\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, PullbackError::ConfigInvalid { key, .. } if key == "max_hold_days"));
    }

    #[test]
    fn zero_period_fails() {
        for key in ["rsi_period", "stochastic_k", "stochastic_d"] {
            let config = make_config(&format!("[backtest]\ncodes = LLY\n[indicators]\n{} = 0\n", key));
            let err = validate_backtest_config(&config).unwrap_err();
            assert!(matches!(err, PullbackError::ConfigInvalid { key: k, .. } if k == key));
        }
    }

    #[test]
    fn period_list_needs_two_entries() {
        let config = make_config("[backtest]\ncodes = LLY\n[indicators]\nsma_periods = 200\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, PullbackError::ConfigInvalid { key, .. } if key == "sma_periods"));
    }

    #[test]
    fn period_list_rejects_bad_entries() {
        for value in ["8,x,34", "8,0,34", "8,,34"] {
            let config = make_config(&format!(
                "[backtest]\ncodes = LLY\n[indicators]\nema_periods = {}\n",
                value
            ));
            let err = validate_backtest_config(&config).unwrap_err();
            assert!(matches!(err, PullbackError::ConfigInvalid { key, .. } if key == "ema_periods"));
        }
    }

    #[test]
    fn rsi_threshold_out_of_range_fails() {
        let config = make_config("[backtest]\ncodes = LLY\n[signal]\nrsi_threshold = 150\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, PullbackError::ConfigInvalid { key, .. } if key == "rsi_threshold"));
    }

    #[test]
    fn malformed_numbers_are_invalid() {
        for (line, key) in [
            ("max_hold_days = ten", "max_hold_days"),
            ("starting_balance = 5k", "starting_balance"),
            ("drawdown_threshold = 0.1O", "drawdown_threshold"),
            ("commission_rate = 0,8%", "commission_rate"),
            ("parallel = maybe", "parallel"),
        ] {
            let config = make_config(&format!("[backtest]\ncodes = LLY\n{}\n", line));
            let err = validate_backtest_config(&config).unwrap_err();
            assert!(
                matches!(&err, PullbackError::ConfigInvalid { key: k, .. } if k == key),
                "{} gave {:?}",
                line,
                err
            );
        }
    }

    #[test]
    fn malformed_indicator_period_is_invalid() {
        let config = make_config("[backtest]\ncodes = LLY\n[indicators]\nrsi_period = two\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, PullbackError::ConfigInvalid { key, .. } if key == "rsi_period"));
    }

    #[test]
    fn stochastic_threshold_must_be_finite_and_non_negative() {
        for value in ["nan", "inf", "-0.5", "abc"] {
            let config = make_config(&format!(
                "[backtest]\ncodes = LLY\n[signal]\nstochastic_threshold = {}\n",
                value
            ));
            let err = validate_backtest_config(&config).unwrap_err();
            assert!(
                matches!(err, PullbackError::ConfigInvalid { key, .. } if key == "stochastic_threshold")
            );
        }
    }

    #[test]
    fn non_finite_balance_fails() {
        let config = make_config("[backtest]\ncodes = LLY\nstarting_balance = NaN\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, PullbackError::ConfigInvalid { key, .. } if key == "starting_balance"));
    }
}
