//! Regression test parameters and operations

use blitkit_core::{RasterView, Rect};

/// Regression test parameters
///
/// Tracks the test name, the index of the current check, and every
/// failure recorded so far. Checks keep going after a failure so one run
/// reports all of them.
pub struct RegParams {
    /// Name of the test (e.g., "format")
    pub test_name: String,
    /// Current check index (incremented before each check)
    index: usize,
    /// Overall success status
    success: bool,
    /// Recorded failures
    failures: Vec<String>,
}

impl RegParams {
    /// Create new regression test parameters
    ///
    /// # Arguments
    ///
    /// * `test_name` - Name of the test (e.g., "format")
    pub fn new(test_name: &str) -> Self {
        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");

        Self {
            test_name: test_name.to_string(),
            index: 0,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current check index
    pub fn index(&self) -> usize {
        self.index
    }

    fn fail(&mut self, msg: String) {
        eprintln!("{}", msg);
        self.failures.push(msg);
        self.success = false;
    }

    /// Compare two floating-point values
    ///
    /// # Arguments
    ///
    /// * `expected` - Expected value
    /// * `actual` - Actual computed value
    /// * `delta` - Maximum allowed difference
    ///
    /// # Returns
    ///
    /// `true` if values match within delta, `false` otherwise.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        if diff > delta {
            let msg = format!(
                "Failure in {}_reg: value comparison for index {}\n\
                 difference = {} but allowed delta = {}\n\
                 expected = {}, actual = {}",
                self.test_name, self.index, diff, delta, expected, actual
            );
            self.fail(msg);
            false
        } else {
            true
        }
    }

    /// Compare two row-major ARGB pixel arrays of width `width`
    ///
    /// # Arguments
    ///
    /// * `expected` - Expected pixels
    /// * `actual` - Actual pixels
    /// * `width` - Row width, used to report coordinates
    /// * `tolerance` - Maximum allowed per-component difference
    ///
    /// # Returns
    ///
    /// `true` if every component is within tolerance, `false` otherwise.
    pub fn compare_pixels(
        &mut self,
        expected: &[u32],
        actual: &[u32],
        width: u32,
        tolerance: u8,
    ) -> bool {
        self.index += 1;

        if expected.len() != actual.len() {
            let msg = format!(
                "Failure in {}_reg: pixel comparison for index {} - length {} vs {}",
                self.test_name,
                self.index,
                expected.len(),
                actual.len()
            );
            self.fail(msg);
            return false;
        }

        let width = width.max(1) as usize;
        for (i, (&e, &a)) in expected.iter().zip(actual).enumerate() {
            if max_component_diff(e, a) > tolerance {
                let msg = format!(
                    "Failure in {}_reg: pixel comparison for index {} - mismatch at ({}, {}): \
                     expected {:#010x}, got {:#010x}",
                    self.test_name,
                    self.index,
                    i % width,
                    i / width,
                    e,
                    a
                );
                self.fail(msg);
                return false;
            }
        }

        true
    }

    /// Compare two views pixel by pixel as straight ARGB
    ///
    /// # Returns
    ///
    /// `true` if the views have equal size and every component is within
    /// `tolerance`, `false` otherwise.
    pub fn compare_views(
        &mut self,
        expected: &RasterView,
        actual: &RasterView,
        tolerance: u8,
    ) -> bool {
        if expected.width() != actual.width() || expected.height() != actual.height() {
            self.index += 1;
            let msg = format!(
                "Failure in {}_reg: view comparison for index {} - dimension mismatch \
                 {}x{} vs {}x{}",
                self.test_name,
                self.index,
                expected.width(),
                expected.height(),
                actual.width(),
                actual.height()
            );
            self.fail(msg);
            return false;
        }
        let rect = Rect::from_size(expected.width(), expected.height());
        match (expected.to_argb_vec(rect, false), actual.to_argb_vec(rect, false)) {
            (Ok(e), Ok(a)) => self.compare_pixels(&e, &a, expected.width(), tolerance),
            (Err(err), _) | (_, Err(err)) => {
                self.index += 1;
                let msg = format!(
                    "Failure in {}_reg: view comparison for index {} - {}",
                    self.test_name, self.index, err
                );
                self.fail(msg);
                false
            }
        }
    }

    /// Clean up and report results
    ///
    /// # Returns
    ///
    /// `true` if all checks passed, `false` if any failed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// Check if all checks have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}

/// Largest absolute difference between corresponding components.
pub fn max_component_diff(a: u32, b: u32) -> u8 {
    (0..4)
        .map(|i| {
            let ca = ((a >> (i * 8)) & 0xFF) as i32;
            let cb = ((b >> (i * 8)) & 0xFF) as i32;
            (ca - cb).unsigned_abs() as u8
        })
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_values_success() {
        let mut rp = RegParams::new("test");
        assert!(rp.compare_values(100.0, 100.0, 0.0));
        assert!(rp.is_success());
    }

    #[test]
    fn test_compare_values_within_delta() {
        let mut rp = RegParams::new("test");
        assert!(rp.compare_values(100.0, 100.5, 1.0));
        assert!(rp.is_success());
    }

    #[test]
    fn test_compare_values_failure() {
        let mut rp = RegParams::new("test");
        assert!(!rp.compare_values(100.0, 200.0, 0.0));
        assert!(!rp.is_success());
        assert_eq!(rp.failures().len(), 1);
    }

    #[test]
    fn test_compare_pixels_tolerance() {
        let mut rp = RegParams::new("test");
        assert!(rp.compare_pixels(&[0xFF10_2030], &[0xFF11_1F30], 1, 1));
        assert!(!rp.compare_pixels(&[0xFF10_2030], &[0xFF12_2030], 1, 1));
        assert!(!rp.compare_pixels(&[0, 0], &[0], 1, 0));
        assert_eq!(rp.index(), 3);
    }

    #[test]
    fn test_max_component_diff() {
        assert_eq!(max_component_diff(0xFF00_0000, 0x0000_0000), 255);
        assert_eq!(max_component_diff(0x0102_0304, 0x0102_0305), 1);
    }
}
