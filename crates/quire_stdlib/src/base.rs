//! The `core` library: always available to every script.

use quire_foundation::{
    Arity, Error, ErrorKind, Facing, Host, Item, NativeFn, Result, Type, Value,
};

/// Functions in the `core` module.
pub static FUNCTIONS: &[NativeFn] = &[
    NativeFn::new("str", Arity::Variadic(0), native_str),
    NativeFn::new("len", Arity::Exact(1), native_len),
    NativeFn::new("min", Arity::Variadic(1), native_min),
    NativeFn::new("max", Arity::Variadic(1), native_max),
    NativeFn::new("abs", Arity::Exact(1), native_abs),
    NativeFn::new("upper", Arity::Exact(1), native_upper),
    NativeFn::new("lower", Arity::Exact(1), native_lower),
    NativeFn::new("contains", Arity::Exact(2), native_contains),
    NativeFn::new("item", Arity::Exact(1), native_item),
    NativeFn::new("facing", Arity::Exact(0), native_facing),
    NativeFn::new("face", Arity::Exact(1), native_face),
    NativeFn::new("behind", Arity::Range(0, 1), native_behind),
    NativeFn::new("compass", Arity::Range(0, 1), native_compass),
    NativeFn::new("relative", Arity::Exact(1), native_relative),
    NativeFn::new("direction-label", Arity::Exact(1), native_direction_label),
];

// =============================================================================
// Strings and collections
// =============================================================================

/// `(str a b ...)`: concatenates the text of every argument. Nil adds nothing.
fn native_str(args: &[Value], _host: &mut dyn Host) -> Result<Value> {
    let text: String = args.iter().filter_map(Value::to_text).collect();
    Ok(Value::from(text))
}

/// `(len x)`: characters in a string, elements in a list, 0 for nil.
#[allow(clippy::cast_possible_wrap)]
fn native_len(args: &[Value], _host: &mut dyn Host) -> Result<Value> {
    match &args[0] {
        Value::String(s) => Ok(Value::Int(s.chars().count() as i64)),
        Value::List(items) => Ok(Value::Int(items.len() as i64)),
        Value::Nil => Ok(Value::Int(0)),
        other => Err(Error::type_mismatch(Type::List, other.value_type())),
    }
}

fn extreme(args: &[Value], pick_later: fn(&Value, &Value) -> bool) -> Result<Value> {
    let mut best = &args[0];
    for arg in &args[1..] {
        if best.partial_cmp(arg).is_none() {
            return Err(Error::type_mismatch(best.value_type(), arg.value_type()));
        }
        if pick_later(best, arg) {
            best = arg;
        }
    }
    Ok(best.clone())
}

fn native_min(args: &[Value], _host: &mut dyn Host) -> Result<Value> {
    extreme(args, |best, arg| arg < best)
}

fn native_max(args: &[Value], _host: &mut dyn Host) -> Result<Value> {
    extreme(args, |best, arg| arg > best)
}

fn native_abs(args: &[Value], _host: &mut dyn Host) -> Result<Value> {
    match &args[0] {
        Value::Int(n) => Ok(Value::Int(n.wrapping_abs())),
        Value::Float(n) => Ok(Value::Float(n.abs())),
        other => Err(Error::type_mismatch(Type::Number, other.value_type())),
    }
}

fn native_upper(args: &[Value], _host: &mut dyn Host) -> Result<Value> {
    Ok(Value::from(args[0].expect_str()?.to_uppercase()))
}

fn native_lower(args: &[Value], _host: &mut dyn Host) -> Result<Value> {
    Ok(Value::from(args[0].expect_str()?.to_lowercase()))
}

/// `(contains coll x)`: list membership, or substring search for strings.
fn native_contains(args: &[Value], _host: &mut dyn Host) -> Result<Value> {
    match (&args[0], &args[1]) {
        (Value::List(items), needle) => Ok(Value::Bool(items.contains(needle))),
        (Value::String(haystack), Value::String(needle)) => {
            Ok(Value::Bool(haystack.contains(&**needle)))
        }
        (Value::String(_), other) => Err(Error::type_mismatch(Type::String, other.value_type())),
        (Value::Nil, _) => Ok(Value::Bool(false)),
        (other, _) => Err(Error::type_mismatch(Type::List, other.value_type())),
    }
}

/// `(item "name")`: an item value. As a statement it joins the room's items.
fn native_item(args: &[Value], _host: &mut dyn Host) -> Result<Value> {
    let name = args[0].expect_str()?.trim();
    if name.is_empty() {
        return Err(Error::new(ErrorKind::InvalidArgument {
            function: "item".to_string(),
            message: "item name must not be empty".to_string(),
        }));
    }
    Ok(Value::from(Item::new(name)))
}

// =============================================================================
// Facing
// =============================================================================

fn facing_arg(value: &Value) -> Result<Facing> {
    value.expect_str()?.parse()
}

/// `(facing)`: the current facing code, such as `"n"`.
fn native_facing(_args: &[Value], host: &mut dyn Host) -> Result<Value> {
    Ok(Value::from(host.facing().code()))
}

/// `(face dir)`: turns the reader. Returns nil so it prints nothing.
fn native_face(args: &[Value], host: &mut dyn Host) -> Result<Value> {
    host.set_facing(facing_arg(&args[0])?);
    Ok(Value::Nil)
}

fn native_behind(args: &[Value], host: &mut dyn Host) -> Result<Value> {
    let facing = match args.first() {
        Some(dir) => facing_arg(dir)?,
        None => host.facing(),
    };
    Ok(Value::from(facing.behind().code()))
}

fn native_compass(args: &[Value], host: &mut dyn Host) -> Result<Value> {
    let facing = match args.first() {
        Some(dir) => facing_arg(dir)?,
        None => host.facing(),
    };
    Ok(Value::from(facing.compass()))
}

/// `(relative dir)`: `front`, `right`, `rear` or `left` of the reader.
fn native_relative(args: &[Value], host: &mut dyn Host) -> Result<Value> {
    Ok(Value::from(host.facing().relative(facing_arg(&args[0])?)))
}

fn native_direction_label(args: &[Value], host: &mut dyn Host) -> Result<Value> {
    Ok(Value::from(
        host.facing().direction_label(facing_arg(&args[0])?),
    ))
}
