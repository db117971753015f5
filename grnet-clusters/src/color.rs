//! Display colors for cell classes.
//!
//! A [`Color`] is either a named color string (e.g. a hex code) or an RGBA
//! quadruple in [0, 1]. Default colors come from a ten-entry categorical
//! palette, or from a [`Colormap`] when there are more than ten classes.

use core::fmt;

use grnet_core::check::ensure_len;
use grnet_core::{GrnetError, Result};

/// The ten-color categorical palette (matplotlib's `tab10`).
pub const TAB10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// A cell-class color.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    /// A color by name or hex code.
    Named(String),
    /// Red, green, blue and alpha, each in [0, 1].
    Rgba([f64; 4]),
}

impl Color {
    /// An RGBA color; every component must be finite and in [0, 1].
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Result<Self> {
        let c = Color::Rgba([r, g, b, a]);
        c.validate()?;
        Ok(c)
    }

    /// An RGBA color from a slice of exactly four components.
    pub fn rgba_from_slice(components: &[f64]) -> Result<Self> {
        ensure_len("color components", 4, components.len())?;
        Self::rgba(components[0], components[1], components[2], components[3])
    }

    /// Check the component range of an RGBA color. Named colors always pass.
    pub fn validate(&self) -> Result<()> {
        if let Color::Rgba(c) = self {
            if let Some(i) = c.iter().position(|v| !(v.is_finite() && (0.0..=1.0).contains(v))) {
                return Err(GrnetError::Invariant(format!(
                    "color component {i} should lie in [0, 1], got {}",
                    c[i]
                )));
            }
        }
        Ok(())
    }

    /// RGBA components, for RGBA colors and `#rrggbb` / `#rrggbbaa` names.
    pub fn to_rgba(&self) -> Option<[f64; 4]> {
        match self {
            Color::Rgba(c) => Some(*c),
            Color::Named(name) => parse_hex(name),
        }
    }
}

fn parse_hex(name: &str) -> Option<[f64; 4]> {
    let hex = name.strip_prefix('#')?;
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok().map(|v| v as f64 / 255.0);
    let alpha = if hex.len() == 8 { channel(6)? } else { 1.0 };
    Some([channel(0)?, channel(2)?, channel(4)?, alpha])
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Named(name) => f.write_str(name),
            Color::Rgba([r, g, b, a]) => write!(f, "({r:.3}, {g:.3}, {b:.3}, {a:.3})"),
        }
    }
}

impl From<&str> for Color {
    fn from(name: &str) -> Self {
        Color::Named(name.to_string())
    }
}

/// A continuous colormap sampled on [0, 1].
///
/// Sampling follows matplotlib's 256-entry lookup tables, so `Jet.sample(x)`
/// matches `plt.cm.jet(x)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Colormap {
    #[default]
    Jet,
    Gray,
    Hot,
    Cool,
}

type Segments = &'static [(f64, f64)];

const JET: [Segments; 3] = [
    &[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)],
    &[(0.0, 0.0), (0.125, 0.0), (0.375, 1.0), (0.64, 1.0), (0.91, 0.0), (1.0, 0.0)],
    &[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)],
];

const HOT: [Segments; 3] = [
    &[(0.0, 0.0416), (0.365079, 1.0), (1.0, 1.0)],
    &[(0.0, 0.0), (0.365079, 0.0), (0.746032, 1.0), (1.0, 1.0)],
    &[(0.0, 0.0), (0.746032, 0.0), (1.0, 1.0)],
];

const LUT_SIZE: usize = 256;

impl Colormap {
    /// Color at `x`, clamped to [0, 1].
    pub fn sample(&self, x: f64) -> Color {
        let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
        let entry = ((x * LUT_SIZE as f64) as usize).min(LUT_SIZE - 1);
        let t = entry as f64 / (LUT_SIZE - 1) as f64;
        let [r, g, b] = match self {
            Colormap::Jet => JET.map(|s| interpolate(s, t)),
            Colormap::Hot => HOT.map(|s| interpolate(s, t)),
            Colormap::Gray => [t, t, t],
            Colormap::Cool => [t, 1.0 - t, 1.0],
        };
        Color::Rgba([r, g, b, 1.0])
    }

    /// `n` colors sampled at `i / n` for `i` in `0..n`.
    pub fn colors(&self, n: usize) -> Vec<Color> {
        (0..n).map(|i| self.sample(i as f64 / n as f64)).collect()
    }
}

fn interpolate(segments: Segments, t: f64) -> f64 {
    for w in segments.windows(2) {
        let ((x0, y0), (x1, y1)) = (w[0], w[1]);
        if t <= x1 {
            return y0 + (y1 - y0) * (t - x0) / (x1 - x0);
        }
    }
    segments.last().map_or(0.0, |&(_, y)| y)
}

/// How colors are assigned to the classes of a registry.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ColorScheme {
    /// [`TAB10`] for up to ten classes, [`Colormap::Jet`] beyond.
    #[default]
    Default,
    /// One color per class.
    Explicit(Vec<Color>),
    /// Class `i` of `n` gets `map.sample(i / n)`.
    Colormap(Colormap),
}

impl ColorScheme {
    /// Resolve to exactly `n` validated colors.
    pub fn resolve(&self, n: usize) -> Result<Vec<Color>> {
        match self {
            ColorScheme::Default if n <= TAB10.len() => {
                Ok(TAB10[..n].iter().map(|&c| Color::from(c)).collect())
            }
            ColorScheme::Default => Ok(Colormap::Jet.colors(n)),
            ColorScheme::Explicit(colors) => {
                if colors.len() != n {
                    return Err(GrnetError::Invariant(format!(
                        "length of colors should be equal to the number of models ({n}), got {}",
                        colors.len()
                    )));
                }
                for c in colors {
                    c.validate()?;
                }
                Ok(colors.clone())
            }
            ColorScheme::Colormap(map) => Ok(map.colors(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grnet_core::ErrorKind;

    fn close(a: [f64; 4], b: [f64; 4]) -> bool {
        a.iter().zip(&b).all(|(x, y)| (x - y).abs() < 1e-3)
    }

    #[test]
    fn rgba_slice_length_checked() {
        assert!(Color::rgba_from_slice(&[0.1, 0.2, 0.3, 0.4]).is_ok());
        let err = Color::rgba_from_slice(&[0.1, 0.2, 0.3]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Contract);
        assert!(Color::rgba_from_slice(&[0.1; 5]).is_err());
    }

    #[test]
    fn rgba_range_checked() {
        assert!(Color::rgba(0.0, 1.0, 0.5, 1.0).is_ok());
        assert_eq!(Color::rgba(1.2, 0.0, 0.0, 1.0).unwrap_err().kind(), ErrorKind::Invariant);
        assert!(Color::rgba(f64::NAN, 0.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn hex_names_parse() {
        assert_eq!(Color::from("#ff0000").to_rgba(), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(Color::from("#00000000").to_rgba(), Some([0.0, 0.0, 0.0, 0.0]));
        assert_eq!(Color::from("red").to_rgba(), None);
        assert_eq!(Color::from("#12345").to_rgba(), None);
    }

    #[test]
    fn jet_endpoints() {
        assert_eq!(Colormap::Jet.sample(0.0), Color::Rgba([0.0, 0.0, 0.5, 1.0]));
        let top = Colormap::Jet.sample(1.0).to_rgba().unwrap();
        assert!(close(top, [0.5, 0.0, 0.0, 1.0]));
        // plt.cm.jet(0.5)
        let mid = Colormap::Jet.sample(0.5).to_rgba().unwrap();
        assert!(close(mid, [0.4902, 1.0, 0.4775, 1.0]), "{mid:?}");
    }

    #[test]
    fn simple_maps() {
        assert_eq!(Colormap::Gray.sample(1.0), Color::Rgba([1.0, 1.0, 1.0, 1.0]));
        assert_eq!(Colormap::Cool.sample(0.0), Color::Rgba([0.0, 1.0, 1.0, 1.0]));
        let hot = Colormap::Hot.sample(1.0).to_rgba().unwrap();
        assert!(close(hot, [1.0, 1.0, 1.0, 1.0]));
    }

    #[test]
    fn default_scheme_switches_at_ten() {
        let ten = ColorScheme::Default.resolve(10).unwrap();
        assert_eq!(ten[0], Color::from("#1f77b4"));
        assert_eq!(ten[9], Color::from("#17becf"));
        let eleven = ColorScheme::Default.resolve(11).unwrap();
        assert_eq!(eleven, Colormap::Jet.colors(11));
        assert!(eleven.iter().all(|c| matches!(c, Color::Rgba(_))));
    }

    #[test]
    fn explicit_scheme_checked() {
        let colors = vec![Color::from("C0"), Color::Rgba([0.1, 0.2, 0.3, 1.0])];
        assert_eq!(ColorScheme::Explicit(colors.clone()).resolve(2).unwrap(), colors);
        assert!(ColorScheme::Explicit(colors).resolve(3).is_err());
        let bad = ColorScheme::Explicit(vec![Color::Rgba([2.0, 0.0, 0.0, 1.0])]);
        assert!(bad.resolve(1).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn any_map() -> impl Strategy<Value = Colormap> {
        prop_oneof![
            Just(Colormap::Jet),
            Just(Colormap::Gray),
            Just(Colormap::Hot),
            Just(Colormap::Cool),
        ]
    }

    proptest! {
        #[test]
        fn samples_are_valid_colors(map in any_map(), x in -1.0f64..2.0) {
            let c = map.sample(x);
            prop_assert!(c.validate().is_ok(), "{:?} at {} gave {}", map, x, c);
        }

        #[test]
        fn resolve_yields_one_color_per_class(n in 0usize..40) {
            prop_assert_eq!(ColorScheme::Default.resolve(n).unwrap().len(), n);
        }
    }
}
