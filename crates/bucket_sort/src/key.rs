use std::cmp::Ordering;
use std::fmt::Debug;

/// Element type accepted by the sorter: a float expected to lie in `[0, 1)`.
pub trait UnitKey: Copy + PartialOrd + Debug + Send + Sync + 'static {
    fn to_f64(self) -> f64;

    /// Converts `x` from `[0, 1)`, rounding down to the largest representable value below
    /// one when the narrowing cast would land on `1.0`.
    fn from_unit_f64(x: f64) -> Self;

    fn total_order(a: &Self, b: &Self) -> Ordering;

    #[inline]
    fn in_unit_interval(self) -> bool {
        let x = self.to_f64();
        (0.0..1.0).contains(&x)
    }

    /// `floor(bucket_count * x)`, assuming `x` already passed `in_unit_interval`.
    #[inline]
    fn bucket_index(self, bucket_count: usize) -> usize {
        debug_assert!(bucket_count > 0);
        let idx = (bucket_count as f64 * self.to_f64()) as usize;
        // n * x can round up to n for x just below 1.0.
        idx.min(bucket_count - 1)
    }
}

macro_rules! impl_unit_key {
    ($($t:ty),*) => {
        $(
            impl UnitKey for $t {
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_unit_f64(x: f64) -> Self {
                    let v = x as $t;
                    if v >= 1.0 {
                        <$t>::from_bits((1.0 as $t).to_bits() - 1)
                    } else {
                        v
                    }
                }

                #[inline]
                fn total_order(a: &Self, b: &Self) -> Ordering {
                    a.total_cmp(b)
                }
            }
        )*
    };
}

impl_unit_key!(f32, f64);
