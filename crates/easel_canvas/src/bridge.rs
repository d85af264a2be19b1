//! Script bridge
//!
//! Dispatches canvas calls arriving from a scripting host as camelCase names
//! with loosely-typed JSON arguments. Argument coercion follows the usual
//! script conventions:
//!
//! - numbers pass through, numeric strings parse, booleans become 1/0 and
//!   `null` becomes 0
//! - anything else (including a missing argument) is NaN, which every drawing
//!   call ignores
//!
//! Unknown methods and properties are logged at debug level and ignored.

use serde_json::{json, Value};

use crate::context::CanvasContext;

/// Invoke a context method by its script name.
///
/// Returns `Value::Null` for methods without a result.
pub fn invoke(ctx: &mut CanvasContext<'_>, method: &str, args: &[Value]) -> Value {
    let n = |index: usize| number(args.get(index));

    match method {
        "save" => ctx.save(),
        "restore" => ctx.restore(),

        "resetTransform" => ctx.reset_transform(),
        "setTransform" => ctx.set_transform(n(0), n(1), n(2), n(3), n(4), n(5)),
        "transform" => ctx.transform(n(0), n(1), n(2), n(3), n(4), n(5)),
        "translate" => ctx.translate(n(0), n(1)),
        "scale" => ctx.scale(n(0), n(1)),
        "rotate" => ctx.rotate(n(0)),

        "beginPath" => ctx.begin_path(),
        "closePath" => ctx.close_path(),
        "moveTo" => ctx.move_to(n(0), n(1)),
        "lineTo" => ctx.line_to(n(0), n(1)),
        "bezierCurveTo" => ctx.bezier_curve_to(n(0), n(1), n(2), n(3), n(4), n(5)),
        "quadraticCurveTo" => ctx.quadratic_curve_to(n(0), n(1), n(2), n(3)),
        "arc" => ctx.arc(n(0), n(1), n(2), n(3), n(4), truthy(args.get(5))),
        "rect" => ctx.rect(n(0), n(1), n(2), n(3)),

        "fill" => ctx.fill(),
        "stroke" => ctx.stroke(),
        "fillRect" => ctx.fill_rect(n(0), n(1), n(2), n(3)),
        "strokeRect" => ctx.stroke_rect(n(0), n(1), n(2), n(3)),
        "clearRect" => ctx.clear_rect(n(0), n(1), n(2), n(3)),
        "fillText" => ctx.fill_text(&text(args.first()), n(1), n(2)),

        "measureText" => {
            let metrics = ctx.measure_text(&text(args.first()));
            return json!({
                "width": script_number(metrics.width),
                "height": script_number(metrics.height),
                "baseline": script_number(metrics.baseline),
            });
        }

        _ => tracing::debug!(method, "ignoring unknown canvas method"),
    }
    Value::Null
}

/// Assign a style attribute by its script name.
///
/// Colors, keywords and fonts only accept strings; numeric attributes coerce.
pub fn set_property(ctx: &mut CanvasContext<'_>, name: &str, value: &Value) {
    let as_str = value.as_str();
    match (name, as_str) {
        ("fillStyle", Some(s)) => ctx.set_fill_style(s),
        ("strokeStyle", Some(s)) => ctx.set_stroke_style(s),
        ("lineCap", Some(s)) => ctx.set_line_cap(s),
        ("lineJoin", Some(s)) => ctx.set_line_join(s),
        ("font", Some(s)) => ctx.set_font(s),
        ("textAlign", Some(s)) => ctx.set_text_align(s),
        ("textBaseline", Some(s)) => ctx.set_text_baseline(s),
        ("lineWidth", _) => ctx.set_line_width(number(Some(value))),
        ("miterLimit", _) => ctx.set_miter_limit(number(Some(value))),
        ("globalAlpha", _) => ctx.set_global_alpha(number(Some(value))),
        _ => tracing::debug!(name, ?value, "ignoring canvas property write"),
    }
}

/// Read a style attribute by its script name; `None` for unknown names
pub fn get_property(ctx: &CanvasContext<'_>, name: &str) -> Option<Value> {
    let value = match name {
        "fillStyle" => Value::from(ctx.fill_style()),
        "strokeStyle" => Value::from(ctx.stroke_style()),
        "lineWidth" => script_number(ctx.line_width()),
        "lineCap" => Value::from(ctx.line_cap()),
        "lineJoin" => Value::from(ctx.line_join()),
        "miterLimit" => script_number(ctx.miter_limit()),
        "globalAlpha" => script_number(ctx.global_alpha()),
        "font" => Value::from(ctx.font()),
        "textAlign" => Value::from(ctx.text_align()),
        "textBaseline" => Value::from(ctx.text_baseline()),
        _ => {
            tracing::debug!(name, "unknown canvas property");
            return None;
        }
    };
    Some(value)
}

/// Report an `f32` as the shortest decimal that reads back as the same value
fn script_number(value: f32) -> Value {
    value
        .to_string()
        .parse::<f64>()
        .map(Value::from)
        .unwrap_or(Value::Null)
}

fn number(value: Option<&Value>) -> f32 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN) as f32,
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(f64::NAN) as f32,
        Some(Value::Bool(b)) => f32::from(u8::from(*b)),
        Some(Value::Null) => 0.0,
        _ => f32::NAN,
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessHost;
    use crate::surface::DrawingSurface;
    use easel_paint::Size;
    use std::rc::Rc;

    fn surface() -> DrawingSurface {
        DrawingSurface::new(Rc::new(HeadlessHost::new(Size::new(100.0, 100.0)))).unwrap()
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(number(Some(&json!(2.5))), 2.5);
        assert_eq!(number(Some(&json!(" 7 "))), 7.0);
        assert_eq!(number(Some(&json!(true))), 1.0);
        assert_eq!(number(Some(&Value::Null)), 0.0);
        assert!(number(Some(&json!("abc"))).is_nan());
        assert!(number(Some(&json!([1]))).is_nan());
        assert!(number(None).is_nan());
    }

    #[test]
    fn test_script_number_keeps_decimal_form() {
        assert_eq!(script_number(0.4), json!(0.4));
        assert_eq!(script_number(2.3), json!(2.3));
        assert_eq!(script_number(1.0), json!(1.0));
        assert_eq!(script_number(f32::NAN), Value::Null);
    }

    #[test]
    fn test_truthiness() {
        assert!(truthy(Some(&json!(true))));
        assert!(truthy(Some(&json!(1))));
        assert!(truthy(Some(&json!("x"))));
        assert!(!truthy(Some(&json!(0))));
        assert!(!truthy(Some(&json!(""))));
        assert!(!truthy(None));
    }

    #[test]
    fn test_invoke_records_commands() {
        let mut surface = surface();
        let mut ctx = surface.context();
        invoke(&mut ctx, "fillRect", &[json!(1), json!("2"), json!(3), json!(4)]);
        assert_eq!(ctx.commands().len(), 1);
        assert_eq!(ctx.commands()[0].bounds(), easel_paint::Rect::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_garbage_arguments_are_ignored() {
        let mut surface = surface();
        let mut ctx = surface.context();
        let before = ctx.state().clone();

        invoke(&mut ctx, "fillRect", &[]);
        invoke(&mut ctx, "translate", &[json!("left"), json!({})]);
        invoke(&mut ctx, "lineTo", &[json!(null)]);
        invoke(&mut ctx, "noSuchMethod", &[json!(1)]);
        set_property(&mut ctx, "lineWidth", &json!("wide"));
        set_property(&mut ctx, "fillStyle", &json!(42));
        set_property(&mut ctx, "bogus", &json!(1));

        assert!(ctx.commands().is_empty());
        assert_eq!(ctx.state(), &before);
    }

    #[test]
    fn test_properties_round_trip() {
        let mut surface = surface();
        let mut ctx = surface.context();
        set_property(&mut ctx, "strokeStyle", &json!("Orange"));
        set_property(&mut ctx, "lineWidth", &json!(4));
        set_property(&mut ctx, "globalAlpha", &json!(1.7));
        set_property(&mut ctx, "textAlign", &json!("center"));

        assert_eq!(get_property(&ctx, "strokeStyle"), Some(json!("#ffa500")));
        assert_eq!(get_property(&ctx, "lineWidth"), Some(json!(4.0)));
        assert_eq!(get_property(&ctx, "globalAlpha"), Some(json!(1.0)));
        assert_eq!(get_property(&ctx, "textAlign"), Some(json!("center")));
        assert_eq!(get_property(&ctx, "nope"), None);
    }

    #[test]
    fn test_measure_text_returns_metrics() {
        let mut surface = surface();
        let mut ctx = surface.context();
        let metrics = invoke(&mut ctx, "measureText", &[json!("abc")]);
        assert!(metrics["width"].as_f64().is_some_and(|w| w > 0.0));
        assert_eq!(invoke(&mut ctx, "save", &[]), Value::Null);
    }
}
