pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

pub fn std_dev(data: &[f64]) -> Option<f64> {
    let mean = mean(data)?;
    let variance = data
        .iter()
        .map(|value| {
            let diff = mean - *value;
            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_response_times() {
        assert_eq!(mean(&[400.0, 600.0, 500.0]), Some(500.0));
        assert_eq!(mean(&[250.0]), Some(250.0));
    }

    #[test]
    fn mean_of_nothing_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(std_dev(&[]), None);
    }

    #[test]
    fn std_dev_of_identical_values_is_zero() {
        assert_eq!(std_dev(&[320.0, 320.0, 320.0]), Some(0.0));
    }

    #[test]
    fn std_dev_of_spread_values() {
        let sd = std_dev(&[100.0, 120.0, 90.0, 102.0, 94.0]).unwrap();
        assert!((sd - 10.322790320451151).abs() < 1e-9);
    }
}
