//! Attribute micro-grammars for SVG values.
//!
//! Built on `winnow` 0.7. The loader calls these for `viewBox`, `points`,
//! lengths and `transform` lists; path data goes through `kurbo`'s own SVG
//! path parser. Errors are plain strings; the loader turns them into
//! diagnostics and never propagates them.

use crate::model::ViewBox;
use kurbo::Affine;
use winnow::combinator::{delimited, opt};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

// ─── Public entry points ─────────────────────────────────────────────────

/// Parse a `viewBox` value: four numbers separated by whitespace and/or commas.
pub fn parse_view_box(input: &str) -> Result<ViewBox, String> {
    let numbers = parse_number_list(input)?;
    let [min_x, min_y, width, height] = numbers[..] else {
        return Err(format!(
            "viewBox needs 4 numbers, found {}",
            numbers.len()
        ));
    };
    let vb = ViewBox::new(min_x, min_y, width, height);
    if !vb.is_valid() {
        return Err(format!("viewBox `{input}` has a non-positive extent"));
    }
    Ok(vb)
}

/// Parse a comma/whitespace separated number list.
pub fn parse_number_list(input: &str) -> Result<Vec<f64>, String> {
    let mut rest = input;
    let mut out = Vec::new();
    skip_separators(&mut rest);
    while !rest.is_empty() {
        let n = parse_number
            .parse_next(&mut rest)
            .map_err(|e| format!("Number list parse error near `{rest}`: {e}"))?;
        out.push(n);
        skip_separators(&mut rest);
    }
    Ok(out)
}

/// Parse a `points` attribute into coordinate pairs.
pub fn parse_points(input: &str) -> Result<Vec<(f64, f64)>, String> {
    let numbers = parse_number_list(input)?;
    if numbers.len() % 2 != 0 {
        return Err(format!(
            "points list has an odd number of coordinates ({})",
            numbers.len()
        ));
    }
    Ok(numbers.chunks_exact(2).map(|p| (p[0], p[1])).collect())
}

/// Parse a length in user units. `px` and bare numbers are accepted;
/// percentages and font-relative units have no fixed scene size.
pub fn parse_length(input: &str) -> Option<f64> {
    let mut rest = input.trim();
    let value = parse_number.parse_next(&mut rest).ok()?;
    match rest.trim() {
        "" | "px" => Some(value),
        "pt" => Some(value * 4.0 / 3.0),
        _ => None,
    }
}

/// Parse a `transform` list into a single affine.
///
/// `translate(10 20) scale(2)` applies the scale first, as SVG specifies.
pub fn parse_transform(input: &str) -> Result<Affine, String> {
    let mut rest = input;
    let mut out = Affine::IDENTITY;
    skip_separators(&mut rest);
    while !rest.is_empty() {
        let step = parse_transform_fn
            .parse_next(&mut rest)
            .map_err(|e| format!("Transform parse error near `{rest}`: {e}"))??;
        out *= step;
        skip_separators(&mut rest);
    }
    Ok(out)
}

// ─── Low-level parsers ──────────────────────────────────────────────────

/// Skip whitespace and commas (SVG `comma-wsp`).
fn skip_separators(input: &mut &str) {
    *input = input.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
}

fn skip_space(input: &mut &str) {
    *input = input.trim_start();
}

/// An SVG number: sign, digits, fraction, exponent. `.5` and `5.` are valid.
fn parse_number(input: &mut &str) -> ModalResult<f64> {
    let start = *input;
    if input.starts_with('-') || input.starts_with('+') {
        *input = &input[1..];
    }
    let int_part: &str =
        take_while(0.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    let mut frac_len = 0;
    if input.starts_with('.') {
        *input = &input[1..];
        let frac: &str = take_while(0.., |c: char| c.is_ascii_digit()).parse_next(input)?;
        frac_len = frac.len();
    }
    if int_part.is_empty() && frac_len == 0 {
        *input = start;
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    // Exponent only when followed by a digit: `2em` is a unit, not `2e`.
    let bytes = input.as_bytes();
    if matches!(bytes.first(), Some(b'e' | b'E')) {
        let digit_at = if matches!(bytes.get(1), Some(b'+' | b'-')) { 2 } else { 1 };
        if bytes.get(digit_at).is_some_and(u8::is_ascii_digit) {
            *input = &input[digit_at..];
            let _: &str = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
        }
    }
    let matched = &start[..start.len() - input.len()];
    matched
        .parse::<f64>()
        .map_err(|_| ErrMode::Backtrack(ContextError::new()))
}

/// One `name(args…)` item. The inner `Result` reports a bad arity.
fn parse_transform_fn(input: &mut &str) -> ModalResult<Result<Affine, String>> {
    let name: &str = take_while(1.., |c: char| c.is_ascii_alphabetic()).parse_next(input)?;
    skip_space(input);
    let args = delimited('(', parse_args, ')').parse_next(input)?;
    Ok(transform_from_args(name, &args))
}

fn parse_args(input: &mut &str) -> ModalResult<Vec<f64>> {
    let mut args = Vec::new();
    skip_separators(input);
    while let Some(n) = opt(parse_number).parse_next(input)? {
        args.push(n);
        skip_separators(input);
    }
    Ok(args)
}

fn transform_from_args(name: &str, args: &[f64]) -> Result<Affine, String> {
    let affine = match (name, args) {
        ("matrix", [a, b, c, d, e, f]) => Affine::new([*a, *b, *c, *d, *e, *f]),
        ("translate", [tx]) => Affine::translate((*tx, 0.0)),
        ("translate", [tx, ty]) => Affine::translate((*tx, *ty)),
        ("scale", [s]) => Affine::scale(*s),
        ("scale", [sx, sy]) => Affine::scale_non_uniform(*sx, *sy),
        ("rotate", [deg]) => Affine::rotate(deg.to_radians()),
        ("rotate", [deg, cx, cy]) => {
            Affine::translate((*cx, *cy))
                * Affine::rotate(deg.to_radians())
                * Affine::translate((-cx, -cy))
        }
        ("skewX", [deg]) => Affine::skew(deg.to_radians().tan(), 0.0),
        ("skewY", [deg]) => Affine::skew(0.0, deg.to_radians().tan()),
        _ => {
            return Err(format!(
                "unsupported transform `{name}` with {} argument(s)",
                args.len()
            ));
        }
    };
    Ok(affine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn view_box_whitespace_and_commas() {
        assert_eq!(
            parse_view_box("0 0 1000 750").unwrap(),
            ViewBox::new(0.0, 0.0, 1000.0, 750.0)
        );
        assert_eq!(
            parse_view_box(" -5,10 , 200.5  300 ").unwrap(),
            ViewBox::new(-5.0, 10.0, 200.5, 300.0)
        );
    }

    #[test]
    fn view_box_rejects_bad_input() {
        assert!(parse_view_box("0 0 100").is_err());
        assert!(parse_view_box("0 0 100 0").is_err());
        assert!(parse_view_box("a b c d").is_err());
        assert!(parse_view_box("").is_err());
    }

    #[test]
    fn numbers_with_exponent_and_fraction() {
        assert_eq!(parse_number_list("1e2 .5 -3. +4").unwrap(), vec![100.0, 0.5, -3.0, 4.0]);
        assert_eq!(parse_number_list("1-2").unwrap(), vec![1.0, -2.0]);
    }

    #[test]
    fn points_pairs() {
        assert_eq!(
            parse_points("0,0 10,0 10,10").unwrap(),
            vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]
        );
        assert!(parse_points("0,0 10").is_err());
    }

    #[test]
    fn lengths() {
        assert_eq!(parse_length("12"), Some(12.0));
        assert_eq!(parse_length("12px"), Some(12.0));
        assert_eq!(parse_length("50%"), None);
        assert_eq!(parse_length("2em"), None);
    }

    #[test]
    fn transform_list_applies_right_to_left() {
        let t = parse_transform("translate(10 20) scale(2)").unwrap();
        assert!(approx(t * Point::new(1.0, 1.0), Point::new(12.0, 22.0)));
    }

    #[test]
    fn transform_rotate_about_center() {
        let t = parse_transform("rotate(90, 10, 10)").unwrap();
        assert!(approx(t * Point::new(20.0, 10.0), Point::new(10.0, 20.0)));
    }

    #[test]
    fn transform_matrix_and_errors() {
        let t = parse_transform("matrix(1,0,0,1,5,6)").unwrap();
        assert!(approx(t * Point::ORIGIN, Point::new(5.0, 6.0)));
        assert!(parse_transform("rotate(1, 2)").is_err());
        assert!(parse_transform("translate(").is_err());
        assert!(parse_transform("explode(3)").is_err());
    }
}
