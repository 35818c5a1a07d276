// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color transforms applied in place to recorded paints.

use peniko::Color;

/// A pure function over colors.
///
/// Transforms compose with [`then`](Self::then): applying `a` and then `b` to
/// a display list gives the same result as applying `a.then(b)` once.
pub trait ColorTransform {
    /// Maps one color.
    fn transform(&self, color: Color) -> Color;

    /// Returns a transform that applies `self` first, then `next`.
    fn then<U: ColorTransform>(self, next: U) -> Compose<Self, U>
    where
        Self: Sized,
    {
        Compose { first: self, next }
    }
}

impl<F> ColorTransform for F
where
    F: Fn(Color) -> Color,
{
    fn transform(&self, color: Color) -> Color {
        self(color)
    }
}

/// Two transforms applied in sequence. See [`ColorTransform::then`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Compose<T, U> {
    first: T,
    next: U,
}

impl<T: ColorTransform, U: ColorTransform> ColorTransform for Compose<T, U> {
    fn transform(&self, color: Color) -> Color {
        self.next.transform(self.first.transform(color))
    }
}

/// Inverts the color channels, keeping alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InvertColors;

impl ColorTransform for InvertColors {
    fn transform(&self, color: Color) -> Color {
        let [r, g, b, a] = color.components;
        Color::new([1.0 - r, 1.0 - g, 1.0 - b, a])
    }
}

/// Scales alpha by a constant factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MultiplyAlpha(pub f32);

impl ColorTransform for MultiplyAlpha {
    fn transform(&self, color: Color) -> Color {
        color.multiply_alpha(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert_is_an_involution() {
        let color = Color::new([0.25, 0.5, 1.0, 0.75]);
        let inverted = InvertColors.transform(color);
        assert_eq!(inverted.components, [0.75, 0.5, 0.0, 0.75]);
        assert_eq!(InvertColors.then(InvertColors).transform(color), color);
    }

    #[test]
    fn compose_applies_in_order() {
        let to_white = |_: Color| Color::WHITE;
        let halve = MultiplyAlpha(0.5);
        assert_eq!(to_white.then(halve).transform(Color::BLACK), Color::WHITE.multiply_alpha(0.5));
        assert_eq!(halve.then(to_white).transform(Color::BLACK), Color::WHITE);
    }
}
