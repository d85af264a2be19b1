//! Parsers for script-supplied style strings
//!
//! Every parser returns `None` on malformed input so callers can keep the
//! previous value. Nothing here panics on arbitrary input.

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{char, multispace0},
    combinator::{all_consuming, map, map_opt, opt, verify},
    number::complete::float,
    sequence::{delimited, preceded, tuple},
    IResult,
};

use crate::color::Color;
use crate::style::{Font, FontStyle, FontWeight, LineCap, LineJoin, TextAlign, TextBaseline};

type ParseResult<'a, O> = IResult<&'a str, O>;

/// Root font size used to resolve `rem`
const ROOT_FONT_SIZE: f32 = 16.0;

// ============================================================================
// Color Parsing
// ============================================================================

/// Parse a paint string: named color, `#rgb`, `#rgba`, `#rrggbb`,
/// `#rrggbbaa`, `rgb(...)` or `rgba(...)`.
pub fn parse_color(input: &str) -> Option<Color> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok((_, color)) = all_consuming(hex_color)(input) {
        return Some(color);
    }

    if let Ok((_, color)) = all_consuming(rgb_function)(input) {
        return Some(color);
    }

    Color::named(input)
}

fn hex_color(input: &str) -> ParseResult<'_, Color> {
    map_opt(
        preceded(char('#'), take_while1(|c: char| c.is_ascii_hexdigit())),
        color_from_hex,
    )(input)
}

fn color_from_hex(hex: &str) -> Option<Color> {
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => Some(Color::from_rgba8(nibble(0)?, nibble(1)?, nibble(2)?, 255)),
        4 => Some(Color::from_rgba8(
            nibble(0)?,
            nibble(1)?,
            nibble(2)?,
            nibble(3)?,
        )),
        6 => Some(Color::from_rgba8(byte(0)?, byte(2)?, byte(4)?, 255)),
        8 => Some(Color::from_rgba8(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

/// A numeric component with an optional trailing `%`
fn component(input: &str) -> ParseResult<'_, (f32, bool)> {
    delimited(
        multispace0,
        tuple((
            verify(float, |v: &f32| v.is_finite()),
            map(opt(char('%')), |pct| pct.is_some()),
        )),
        multispace0,
    )(input)
}

/// Parse `rgb(r, g, b)` / `rgba(r, g, b, a)`; channels are 0-255 or percentages
fn rgb_function(input: &str) -> ParseResult<'_, Color> {
    let (input, _) = alt((tag_no_case("rgba"), tag_no_case("rgb")))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = char('(')(input)?;
    let (input, r) = component(input)?;
    let (input, _) = char(',')(input)?;
    let (input, g) = component(input)?;
    let (input, _) = char(',')(input)?;
    let (input, b) = component(input)?;
    let (input, a) = opt(preceded(char(','), component))(input)?;
    let (input, _) = char(')')(input)?;

    let channel = |(value, pct): (f32, bool)| {
        if pct {
            (value / 100.0).clamp(0.0, 1.0)
        } else {
            (value / 255.0).clamp(0.0, 1.0)
        }
    };
    let alpha = match a {
        Some((value, true)) => (value / 100.0).clamp(0.0, 1.0),
        Some((value, false)) => value.clamp(0.0, 1.0),
        None => 1.0,
    };

    Ok((input, Color::new(channel(r), channel(g), channel(b), alpha)))
}

// ============================================================================
// Keyword Parsing
// ============================================================================

pub fn parse_line_cap(input: &str) -> Option<LineCap> {
    match input {
        "butt" => Some(LineCap::Butt),
        "round" => Some(LineCap::Round),
        "square" => Some(LineCap::Square),
        _ => None,
    }
}

pub fn parse_line_join(input: &str) -> Option<LineJoin> {
    match input {
        "miter" => Some(LineJoin::Miter),
        "round" => Some(LineJoin::Round),
        "bevel" => Some(LineJoin::Bevel),
        _ => None,
    }
}

pub fn parse_text_align(input: &str) -> Option<TextAlign> {
    match input {
        "start" => Some(TextAlign::Start),
        "end" => Some(TextAlign::End),
        "left" => Some(TextAlign::Left),
        "right" => Some(TextAlign::Right),
        "center" => Some(TextAlign::Center),
        _ => None,
    }
}

pub fn parse_text_baseline(input: &str) -> Option<TextBaseline> {
    match input {
        "top" => Some(TextBaseline::Top),
        "hanging" => Some(TextBaseline::Hanging),
        "middle" => Some(TextBaseline::Middle),
        "alphabetic" => Some(TextBaseline::Alphabetic),
        "ideographic" => Some(TextBaseline::Ideographic),
        "bottom" => Some(TextBaseline::Bottom),
        _ => None,
    }
}

// ============================================================================
// Font Shorthand
// ============================================================================

/// Apply a font shorthand such as `italic bold 12px serif` on top of `current`.
///
/// Tokens are read left to right: a size token (`px`, `pt`, `em`, `rem`, `%`)
/// sets the size, `italic`/`oblique` set the style, `bold` or a numeric weight
/// sets the weight, and any other token replaces the family, so the last
/// family-like token wins. Returns `None` when there is nothing to apply.
pub fn parse_font(input: &str, current: &Font) -> Option<Font> {
    let mut font = current.clone();
    let mut applied = false;

    for token in input.split_whitespace() {
        // `12px/1.5` carries a line height we have no use for
        let token = token.split('/').next().unwrap_or(token);

        if let Some(size) = font_size(token, current.size) {
            font.size = size;
            applied = true;
            continue;
        }
        if is_sized_token(token) {
            continue;
        }

        match token.to_ascii_lowercase().as_str() {
            "italic" => font.style = FontStyle::Italic,
            "oblique" => font.style = FontStyle::Oblique,
            "bold" => font.weight = FontWeight::BOLD,
            "normal" | "small-caps" => {}
            lower => {
                if let Some(weight) = numeric_weight(lower) {
                    font.weight = weight;
                } else {
                    let family = token.trim_matches(|c: char| c == '"' || c == '\'' || c == ',');
                    if family.is_empty() {
                        continue;
                    }
                    font.family = family.to_string();
                }
            }
        }
        applied = true;
    }

    applied.then_some(font)
}

const SIZE_UNITS: [&str; 5] = ["px", "pt", "rem", "em", "%"];

/// A token shaped like a length (`12px`, `-3em`) even if its number is unusable
fn is_sized_token(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    SIZE_UNITS.iter().any(|unit| {
        lower.strip_suffix(unit).is_some_and(|rest| {
            rest.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
        })
    })
}

fn font_size(token: &str, current_size: f32) -> Option<f32> {
    let lower = token.to_ascii_lowercase();
    let (unit, number) = SIZE_UNITS
        .iter()
        .find_map(|unit| lower.strip_suffix(unit).map(|rest| (*unit, rest)))?;

    let (_, value) = all_consuming(float::<&str, nom::error::Error<&str>>)(number).ok()?;
    let size = match unit {
        "px" => value,
        "pt" => value * 4.0 / 3.0,
        "rem" => value * ROOT_FONT_SIZE,
        "em" => value * current_size,
        "%" => value / 100.0 * current_size,
        _ => return None,
    };

    (size.is_finite() && size > 0.0).then_some(size)
}

fn numeric_weight(token: &str) -> Option<FontWeight> {
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let weight: u16 = token.parse().ok()?;
    (1..=1000).contains(&weight).then_some(FontWeight(weight))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Color, b: Color) -> bool {
        (a.r - b.r).abs() < 1e-3
            && (a.g - b.g).abs() < 1e-3
            && (a.b - b.b).abs() < 1e-3
            && (a.a - b.a).abs() < 1e-3
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(parse_color("#ff0000"), Some(Color::RED));
        assert_eq!(parse_color("#f00"), Some(Color::RED));
        assert_eq!(parse_color("#f008"), Some(Color::from_rgba8(255, 0, 0, 0x88)));
        assert_eq!(parse_color("#ff000080"), Some(Color::from_rgba8(255, 0, 0, 0x80)));
        assert_eq!(parse_color("#ff00"), Some(Color::from_rgba8(255, 255, 0, 0)));
        assert_eq!(parse_color("#ff0000f"), None);
        assert_eq!(parse_color("#gg0000"), None);
        assert_eq!(parse_color("#"), None);
    }

    #[test]
    fn test_rgb_functions() {
        assert_eq!(parse_color("rgb(255, 0, 0)"), Some(Color::RED));
        assert_eq!(parse_color("RGB( 255 ,0,0 )"), Some(Color::RED));

        let translucent = parse_color("rgba(0, 0, 255, 0.5)").unwrap();
        assert!(close(translucent, Color::new(0.0, 0.0, 1.0, 0.5)));

        let pct = parse_color("rgb(100%, 50%, 0%)").unwrap();
        assert!(close(pct, Color::new(1.0, 0.5, 0.0, 1.0)));

        // out of range channels clamp
        let clamped = parse_color("rgba(300, -5, 0, 2)").unwrap();
        assert!(close(clamped, Color::RED));

        assert_eq!(parse_color("rgb(1, 2)"), None);
        assert_eq!(parse_color("rgb(1, 2, 3"), None);
        assert_eq!(parse_color("rgb(1, 2, 3) trailing"), None);
    }

    #[test]
    fn test_named_and_garbage() {
        assert_eq!(parse_color("  red "), Some(Color::RED));
        assert_eq!(parse_color("Blue"), Some(Color::rgb(0.0, 0.0, 1.0)));
        assert_eq!(parse_color(""), None);
        assert_eq!(parse_color("not-a-color"), None);
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(parse_line_cap("round"), Some(LineCap::Round));
        assert_eq!(parse_line_cap("Round"), None);
        assert_eq!(parse_line_join("bevel"), Some(LineJoin::Bevel));
        assert_eq!(parse_line_join("sharp"), None);
        assert_eq!(parse_text_align("center"), Some(TextAlign::Center));
        assert_eq!(parse_text_align("middle"), None);
        assert_eq!(parse_text_baseline("middle"), Some(TextBaseline::Middle));
        assert_eq!(parse_text_baseline("center"), None);
    }

    #[test]
    fn test_font_shorthand() {
        let font = parse_font("italic bold 12px serif", &Font::default()).unwrap();
        assert_eq!(font.size, 12.0);
        assert_eq!(font.style, FontStyle::Italic);
        assert_eq!(font.weight, FontWeight::BOLD);
        assert_eq!(font.family, "serif");
    }

    #[test]
    fn test_font_last_family_wins() {
        let font = parse_font("16px Helvetica, Arial", &Font::default()).unwrap();
        assert_eq!(font.family, "Arial");
        assert_eq!(font.size, 16.0);
    }

    #[test]
    fn test_font_units() {
        let base = Font::default();
        assert_eq!(parse_font("12pt x", &base).unwrap().size, 16.0);
        assert_eq!(parse_font("2em x", &base).unwrap().size, 20.0);
        assert_eq!(parse_font("1rem x", &base).unwrap().size, 16.0);
        assert_eq!(parse_font("14px/1.5 x", &base).unwrap().size, 14.0);
        assert_eq!(parse_font("300 x", &base).unwrap().weight, FontWeight(300));
    }

    #[test]
    fn test_font_keeps_unmentioned_fields() {
        let bold = parse_font("bold 20px serif", &Font::default()).unwrap();
        let font = parse_font("monospace", &bold).unwrap();
        assert_eq!(font.family, "monospace");
        assert_eq!(font.size, 20.0);
        assert_eq!(font.weight, FontWeight::BOLD);
    }

    #[test]
    fn test_font_rejects_empty() {
        assert_eq!(parse_font("", &Font::default()), None);
        assert_eq!(parse_font("   ", &Font::default()), None);
        // a bad size is skipped rather than becoming the family
        let font = parse_font("-4px serif", &Font::default()).unwrap();
        assert_eq!(font.size, 10.0);
        assert_eq!(font.family, "serif");
    }
}
