use std::process::Command;

use crate::error::SampleError;

/// Process whose CPU share is monitored
pub const TARGET_PROCESS: &str = "kernel_task";

/// Source of kernel_task CPU readings.
///
/// A call blocks for roughly one second while `top` takes its two samples.
pub trait Sampler: Send {
    fn sample(&mut self) -> Result<f64, SampleError>;
}

/// Samples kernel_task through `top -l 2 -s 1 -pid 0`.
///
/// The first of the two samples reports CPU time accumulated since boot; only
/// the second one reflects current load.
pub struct TopSampler {
    program: String,
    args: Vec<String>,
}

impl TopSampler {
    pub fn new() -> Self {
        Self {
            program: "top".to_string(),
            args: ["-l", "2", "-s", "1", "-pid", "0"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for TopSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for TopSampler {
    fn sample(&mut self) -> Result<f64, SampleError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| {
                SampleError::ExecutionFailed(format!("failed to run {}: {}", self.program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            let message = if stderr.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                format!("{} exited with {}: {}", self.program, output.status, stderr)
            };
            return Err(SampleError::ExecutionFailed(message));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| SampleError::ParseFailed(format!("output is not UTF-8: {}", e)))?;

        parse_top_output(&stdout)
    }
}

/// Extract the CPU percentage of the last kernel_task line in `top` output.
///
/// A listing without any kernel_task line yields `0.0`: the process always
/// exists, so its absence means top rounded it away.
pub fn parse_top_output(output: &str) -> Result<f64, SampleError> {
    let line = match output.lines().rev().find(|l| l.contains(TARGET_PROCESS)) {
        Some(line) => line,
        None => {
            log::debug!("no {} line in top output, treating as 0%", TARGET_PROCESS);
            return Ok(0.0);
        }
    };

    // PID COMMAND %CPU ...
    let field = line.split_whitespace().nth(2).ok_or_else(|| {
        SampleError::ParseFailed(format!("missing %CPU column in '{}'", line.trim()))
    })?;

    let value = field
        .strip_suffix('%')
        .unwrap_or(field)
        .parse::<f64>()
        .map_err(|e| SampleError::ParseFailed(format!("bad %CPU value '{}': {}", field, e)))?;

    // f64 parsing also accepts "NaN", "inf" and signs
    if !value.is_finite() || value < 0.0 {
        return Err(SampleError::ParseFailed(format!("%CPU value '{}' out of range", field)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SAMPLES: &str = "\
Processes: 612 total, 3 running, 609 sleeping, 3391 threads
2024/05/01 10:00:00
Load Avg: 2.31, 2.10, 1.98

PID    COMMAND      %CPU TIME     #TH    #WQ  #PORT MEM
0      kernel_task  0.0  10:32:11 571/12 0    0     12M

Processes: 612 total, 3 running, 609 sleeping, 3391 threads
2024/05/01 10:00:01
Load Avg: 2.31, 2.10, 1.98

PID    COMMAND      %CPU TIME     #TH    #WQ  #PORT MEM
0      kernel_task  12.3% 10:32:12 571/12 0    0     12M
";

    #[test]
    fn test_second_sample_wins() {
        assert_eq!(parse_top_output(TWO_SAMPLES).unwrap(), 12.3);
    }

    #[test]
    fn test_single_sample() {
        let output = "PID COMMAND %CPU\n0   kernel_task 7.5 10:00.00\n";
        assert_eq!(parse_top_output(output).unwrap(), 7.5);
    }

    #[test]
    fn test_missing_line_is_zero() {
        let output = "PID COMMAND %CPU\n312 WindowServer 14.0\n";
        assert_eq!(parse_top_output(output).unwrap(), 0.0);
        assert_eq!(parse_top_output("").unwrap(), 0.0);
    }

    #[test]
    fn test_malformed_field() {
        let err = parse_top_output("0 kernel_task n/a%\n").unwrap_err();
        assert!(matches!(err, SampleError::ParseFailed(_)));

        let err = parse_top_output("0 kernel_task\n").unwrap_err();
        assert!(matches!(err, SampleError::ParseFailed(_)));
    }

    #[test]
    fn test_rejects_negative_and_non_finite() {
        let lines = [
            "0 kernel_task -3.0% 1:00\n",
            "0 kernel_task NaN% 1:00\n",
            "0 kernel_task inf 1:00\n",
        ];
        for line in lines {
            let err = parse_top_output(line).unwrap_err();
            assert!(matches!(err, SampleError::ParseFailed(_)), "{line:?} gave {err:?}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_exit_carries_stderr() {
        let mut sampler = TopSampler {
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                "echo 'must be run privileged' >&2; exit 1".to_string(),
            ],
        };

        let err = sampler.sample().unwrap_err();
        assert!(matches!(err, SampleError::ExecutionFailed(_)));
        assert!(crate::error::is_privilege_message(&err.to_string()));
    }

    #[test]
    fn test_missing_program() {
        let mut sampler = TopSampler {
            program: "ktm-no-such-top".to_string(),
            args: Vec::new(),
        };

        let err = sampler.sample().unwrap_err();
        assert!(matches!(err, SampleError::ExecutionFailed(_)));
        assert!(err.to_string().contains("failed to run ktm-no-such-top"));
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_run_is_parsed() {
        let mut sampler = TopSampler {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "echo '0 kernel_task 8.5% 1:00'".to_string()],
        };
        assert_eq!(sampler.sample().unwrap(), 8.5);
    }

    #[test]
    fn test_above_hundred() {
        assert_eq!(parse_top_output("0 kernel_task 312.4% 1:00\n").unwrap(), 312.4);
    }
}
