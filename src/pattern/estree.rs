//! Shape helpers for ESTree nodes.

use super::{array_with_element_pat, object_pat, or_pat, type_pat, Pattern, Variable};

/// `Identifier` with the given name.
pub fn identifier(name: &str) -> Pattern {
    object_pat([("type", Pattern::from("Identifier")), ("name", Pattern::from(name))])
}

/// `Identifier` with any of the given names.
pub fn identifier_in(names: &[&str]) -> Pattern {
    or_pat(names.iter().map(|name| identifier(name)))
}

/// String `Literal` whose value is captured by `var`.
pub fn string_literal(var: &Variable) -> Pattern {
    object_pat([("type", Pattern::from("Literal")), ("value", var.pattern())])
}

/// `CallExpression` whose callee matches `callee`.
pub fn call(callee: Pattern) -> Pattern {
    object_pat([("type", Pattern::from("CallExpression")), ("callee", callee)])
}

/// `CallExpression` whose callee and argument list match.
pub fn call_with(callee: Pattern, arguments: Pattern) -> Pattern {
    object_pat([
        ("type", Pattern::from("CallExpression")),
        ("callee", callee),
        ("arguments", arguments),
    ])
}

/// Non-computed `object.property` member access.
pub fn member(object: Pattern, property: &str) -> Pattern {
    object_pat([
        ("type", Pattern::from("MemberExpression")),
        ("object", object),
        ("property", identifier(property)),
        ("computed", Pattern::from(false)),
    ])
}

/// Any function expression or declaration whose parameter list matches.
pub fn function_with_params(params: Pattern) -> Pattern {
    object_pat([
        (
            "type",
            or_pat([
                Pattern::from("FunctionExpression"),
                Pattern::from("FunctionDeclaration"),
                Pattern::from("ArrowFunctionExpression"),
            ]),
        ),
        ("params", params),
    ])
}

/// Argument list with some element matching `element`.
pub fn some_argument(element: Pattern) -> Pattern {
    array_with_element_pat(element)
}

/// `ArrayExpression` node.
pub fn array_expression() -> Pattern {
    type_pat("ArrayExpression")
}
