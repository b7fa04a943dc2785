pub mod defs;
pub mod util;

#[macro_export]
macro_rules! assert_eq_f32 {
    ($left:expr, $right:expr) => {{
        let (left, right) = (($left) as f32, ($right) as f32);
        assert!(
            (left - right).abs() < 1E-6,
            "floats differ: {} vs {}",
            left,
            right
        );
    }};
}
