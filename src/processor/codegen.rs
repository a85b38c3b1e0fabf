//! Lowers the AST into named command artifacts.
//!
//! Every value lives on one of two scoreboard objectives: user variables on
//! `MClangVars`, scratch registers `t0`, `t1`, … on `MClangTemp`. An
//! expression evaluated at depth `d` leaves its value in `t<d>`; its right
//! operand is evaluated one level deeper so the left value survives.
//!
//! `if` bodies are split into synthetic artifacts `if_1`, `if_2`, … which
//! the enclosing artifact invokes behind an `execute if|unless` guard.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Value, json};

use super::ast::{BinOp, Block, Node, Number, UnaryOp};
use super::error::{CompileError, CompileResult};
use super::position::Span;
use super::script_parser::{MAX_NESTING_DEPTH, is_builtin};

pub const VARS_OBJECTIVE: &str = "MClangVars";
pub const TEMP_OBJECTIVE: &str = "MClangTemp";

/// One emitted function file: a name and its commands in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub lines: Vec<String>,
}

impl Artifact {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

pub type Artifacts = BTreeMap<String, Artifact>;

/// Mutable bookkeeping for one compile, threaded through every lowering call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoweringState {
    /// Register the expression currently being lowered writes to.
    pub temp_depth: usize,
    /// Register holding the most recently completed expression.
    pub result_depth: usize,
    /// Last synthetic block number handed out.
    pub block_counter: usize,
    /// Set by `not`; consumed (and cleared) by the next comparison.
    pub negate_next: bool,
}

impl LoweringState {
    fn reset_registers(&mut self) {
        self.temp_depth = 0;
        self.result_depth = 0;
    }

    /// `if` when the test should hold, `unless` otherwise, after applying
    /// and clearing any pending `not`.
    fn take_guard(&mut self, holds: bool) -> &'static str {
        let holds = holds != self.negate_next;
        self.negate_next = false;
        if holds { "if" } else { "unless" }
    }

    fn next_block_name(&mut self) -> String {
        self.block_counter += 1;
        format!("if_{}", self.block_counter)
    }
}

fn temp(depth: usize) -> String {
    format!("t{depth} {TEMP_OBJECTIVE}")
}

fn var(name: &str) -> String {
    format!("{name} {VARS_OBJECTIVE}")
}

/// `n`, `-n`, `--n`, … folded to a plain literal.
fn literal_of(node: &Node) -> Option<Number> {
    match node {
        Node::Number { value, .. } => Some(*value),
        Node::UnaryOp {
            op: UnaryOp::Neg,
            operand,
            ..
        } => literal_of(operand).map(Number::negated),
        _ => None,
    }
}

/// `literal_of`, rejecting integers the scoreboard cannot hold.
///
/// Floats pass through unchecked and are emitted as written; the game
/// rejects such lines when the pack loads.
fn checked_literal(node: &Node) -> CompileResult<Option<Number>> {
    match literal_of(node) {
        Some(Number::Int(v)) if i32::try_from(v).is_err() => Err(CompileError::syntax(
            node.span(),
            "integer literal out of range",
        )),
        literal => Ok(literal),
    }
}

fn compound_op(op: BinOp) -> Option<&'static str> {
    match op {
        BinOp::Add => Some("+="),
        BinOp::Sub => Some("-="),
        BinOp::Mul => Some("*="),
        BinOp::Div => Some("/="),
        BinOp::Eq | BinOp::NotEq => None,
    }
}

/// Lower a parsed program into its artifact table.
///
/// Only function declarations may appear at top level; each becomes one
/// artifact named after the function.
pub fn generate(program: &Block, namespace: &str) -> CompileResult<Artifacts> {
    let functions = declared_functions(program)?;
    let mut generator = Generator::new(namespace, functions);
    let mut state = LoweringState::default();

    for node in &program.body {
        if let Node::FunctionDecl { name, body, .. } = node {
            let lines = generator.lower_block(&mut state, body)?;
            generator.insert(name, lines);
        }
    }

    Ok(generator.finish())
}

fn declared_functions(program: &Block) -> CompileResult<BTreeSet<String>> {
    let mut functions = BTreeSet::new();
    for node in &program.body {
        match node {
            Node::FunctionDecl { name, span, .. } => {
                if is_builtin(name) {
                    return Err(CompileError::unsupported(
                        *span,
                        format!("function `{name}` shadows a builtin"),
                    ));
                }
                if !functions.insert(name.clone()) {
                    return Err(CompileError::unsupported(
                        *span,
                        format!("function `{name}` is declared twice"),
                    ));
                }
            }
            other => {
                return Err(CompileError::unsupported(
                    other.span(),
                    "statements must be inside a function",
                ));
            }
        }
    }
    Ok(functions)
}

pub struct Generator<'a> {
    namespace: &'a str,
    functions: BTreeSet<String>,
    artifacts: Artifacts,
    recursion: usize,
}

impl<'a> Generator<'a> {
    pub fn new(namespace: &'a str, functions: BTreeSet<String>) -> Self {
        Self {
            namespace,
            functions,
            artifacts: Artifacts::new(),
            recursion: 0,
        }
    }

    pub fn finish(self) -> Artifacts {
        self.artifacts
    }

    fn insert(&mut self, name: &str, lines: Vec<String>) {
        crate::codegen_log!(Bright Black "Artifact ", name, ": ", lines.len(), " commands");
        self.artifacts.insert(
            name.to_string(),
            Artifact {
                name: name.to_string(),
                lines,
            },
        );
    }

    fn guard(&mut self, span: Span) -> CompileResult<()> {
        self.recursion += 1;
        if self.recursion > MAX_NESTING_DEPTH {
            return Err(CompileError::too_deep(span, MAX_NESTING_DEPTH));
        }
        Ok(())
    }

    fn unguard(&mut self) {
        self.recursion = self.recursion.saturating_sub(1);
    }

    pub fn lower_block(
        &mut self,
        state: &mut LoweringState,
        block: &Block,
    ) -> CompileResult<Vec<String>> {
        let mut out = Vec::<String>::new();
        for node in &block.body {
            self.lower_statement(state, node, &mut out)?;
        }
        Ok(out)
    }

    fn lower_statement(
        &mut self,
        state: &mut LoweringState,
        node: &Node,
        out: &mut Vec<String>,
    ) -> CompileResult<()> {
        match node {
            Node::VarAssign { name, value, .. } => self.lower_assign(state, name, value, out),
            Node::Call {
                callee, args, span, ..
            } => self.lower_call(state, callee, args, *span, out),
            Node::If {
                condition, body, ..
            } => self.lower_if(state, condition, body, out),
            Node::FunctionDecl { span, .. } => Err(CompileError::unsupported(
                *span,
                "nested function declarations are not supported",
            )),
            Node::Number { span, .. }
            | Node::String { span, .. }
            | Node::VarAccess { span, .. }
            | Node::UnaryOp { span, .. }
            | Node::BinOp { span, .. } => Err(CompileError::unsupported(
                *span,
                "expression used as a statement",
            )),
            Node::CodeBlock(block) => Err(CompileError::unsupported(
                block.span,
                "bare blocks are not supported",
            )),
        }
    }

    pub fn lower_assign(
        &mut self,
        state: &mut LoweringState,
        name: &str,
        value: &Node,
        out: &mut Vec<String>,
    ) -> CompileResult<()> {
        if let Some(literal) = checked_literal(value)? {
            out.push(format!("scoreboard players set {} {literal}", var(name)));
            return Ok(());
        }

        match value {
            Node::VarAccess { name: source, .. } => {
                out.push(format!(
                    "scoreboard players operation {} = {}",
                    var(name),
                    var(source)
                ));
            }
            Node::String { span, .. } => {
                return Err(CompileError::unsupported(
                    *span,
                    "strings can only be printed",
                ));
            }
            _ => {
                state.reset_registers();
                self.lower_value(state, value, out)?;
                out.push(format!(
                    "scoreboard players operation {} = {}",
                    var(name),
                    temp(state.result_depth)
                ));
            }
        }
        Ok(())
    }

    /// Evaluate `node` into `t<state.temp_depth>`.
    fn lower_value(
        &mut self,
        state: &mut LoweringState,
        node: &Node,
        out: &mut Vec<String>,
    ) -> CompileResult<()> {
        self.guard(node.span())?;
        let res = self.lower_value_inner(state, node, out);
        self.unguard();
        res
    }

    fn lower_value_inner(
        &mut self,
        state: &mut LoweringState,
        node: &Node,
        out: &mut Vec<String>,
    ) -> CompileResult<()> {
        let d = state.temp_depth;
        if d >= MAX_NESTING_DEPTH {
            return Err(CompileError::too_deep(node.span(), MAX_NESTING_DEPTH));
        }

        if let Some(literal) = checked_literal(node)? {
            out.push(format!("scoreboard players set {} {literal}", temp(d)));
            state.result_depth = d;
            return Ok(());
        }

        match node {
            Node::VarAccess { name, .. } => {
                out.push(format!(
                    "scoreboard players operation {} = {}",
                    temp(d),
                    var(name)
                ));
            }
            Node::UnaryOp {
                op: UnaryOp::Neg,
                operand,
                ..
            } => {
                out.push(format!("scoreboard players set {} 0", temp(d)));
                self.lower_deeper(state, operand, out)?;
                out.push(format!(
                    "scoreboard players operation {} -= {}",
                    temp(d),
                    temp(d + 1)
                ));
            }
            Node::BinOp {
                left,
                op,
                right,
                span,
            } => {
                let Some(compound) = compound_op(*op) else {
                    return Err(CompileError::unsupported(
                        *span,
                        "comparisons can only be used as if conditions",
                    ));
                };
                self.lower_value(state, left, out)?;
                self.lower_deeper(state, right, out)?;
                out.push(format!(
                    "scoreboard players operation {} {compound} {}",
                    temp(d),
                    temp(d + 1)
                ));
            }
            Node::UnaryOp {
                op: UnaryOp::Not,
                span,
                ..
            } => {
                return Err(CompileError::unsupported(
                    *span,
                    "`not` can only be used in if conditions",
                ));
            }
            Node::String { span, .. } => {
                return Err(CompileError::unsupported(
                    *span,
                    "strings can only be printed",
                ));
            }
            Node::Number { span, .. } => {
                // handled by checked_literal above
                return Err(CompileError::unsupported(*span, "unexpected literal"));
            }
            Node::VarAssign { span, .. }
            | Node::Call { span, .. }
            | Node::If { span, .. }
            | Node::FunctionDecl { span, .. } => {
                return Err(CompileError::unsupported(
                    *span,
                    "statement used as a value",
                ));
            }
            Node::CodeBlock(block) => {
                return Err(CompileError::unsupported(
                    block.span,
                    "block used as a value",
                ));
            }
        }

        state.result_depth = d;
        Ok(())
    }

    /// Lower `node` one register deeper, then release that register.
    fn lower_deeper(
        &mut self,
        state: &mut LoweringState,
        node: &Node,
        out: &mut Vec<String>,
    ) -> CompileResult<()> {
        state.temp_depth += 1;
        let res = self.lower_value(state, node, out);
        state.temp_depth = state.temp_depth.saturating_sub(1);
        res
    }

    /// Emit the set-up for `condition` into `out` and return the
    /// `execute …` prefix that guards the conditional call.
    fn lower_condition(
        &mut self,
        state: &mut LoweringState,
        condition: &Node,
        out: &mut Vec<String>,
    ) -> CompileResult<String> {
        self.guard(condition.span())?;
        let res = self.lower_condition_inner(state, condition, out);
        self.unguard();
        res
    }

    fn lower_condition_inner(
        &mut self,
        state: &mut LoweringState,
        condition: &Node,
        out: &mut Vec<String>,
    ) -> CompileResult<String> {
        match condition {
            Node::UnaryOp {
                op: UnaryOp::Not,
                operand,
                ..
            } => {
                state.negate_next = !state.negate_next;
                self.lower_condition(state, operand, out)
            }
            Node::BinOp {
                left, op, right, ..
            } if op.is_comparison() => {
                state.reset_registers();
                self.lower_value(state, left, out)?;
                self.lower_deeper(state, right, out)?;

                let matches = *op == BinOp::Eq;
                let guard = state.take_guard(matches);
                Ok(format!(
                    "execute {guard} score {} = {}",
                    temp(state.temp_depth),
                    temp(state.temp_depth + 1)
                ))
            }
            other => {
                state.reset_registers();
                self.lower_value(state, other, out)?;
                let guard = state.take_guard(false);
                Ok(format!(
                    "execute {guard} score {} matches 0",
                    temp(state.result_depth)
                ))
            }
        }
    }

    fn lower_if(
        &mut self,
        state: &mut LoweringState,
        condition: &Node,
        body: &Block,
        out: &mut Vec<String>,
    ) -> CompileResult<()> {
        let block_name = state.next_block_name();

        let mut setup = Vec::<String>::new();
        let guard = self.lower_condition(state, condition, &mut setup)?;

        self.guard(body.span)?;
        let lines = self.lower_block(state, body);
        self.unguard();
        self.insert(&block_name, lines?);

        out.extend(setup);
        out.push(format!(
            "{guard} run function {}:{block_name}",
            self.namespace
        ));
        Ok(())
    }

    fn lower_call(
        &mut self,
        state: &mut LoweringState,
        callee: &str,
        args: &[Node],
        span: Span,
        out: &mut Vec<String>,
    ) -> CompileResult<()> {
        if is_builtin(callee) {
            return match callee {
                "print" => self.lower_print(state, args, span, out),
                other => Err(CompileError::unsupported(
                    span,
                    format!("builtin `{other}` has no lowering"),
                )),
            };
        }

        if !args.is_empty() {
            return Err(CompileError::unsupported(
                span,
                format!("`{callee}` takes no arguments"),
            ));
        }
        if !self.functions.contains(callee) {
            return Err(CompileError::unsupported(
                span,
                format!("call to undefined function `{callee}`"),
            ));
        }

        out.push(format!("function {}:{callee}", self.namespace));
        Ok(())
    }

    fn lower_print(
        &mut self,
        state: &mut LoweringState,
        args: &[Node],
        span: Span,
        out: &mut Vec<String>,
    ) -> CompileResult<()> {
        let [arg] = args else {
            return Err(CompileError::unsupported(
                span,
                format!("print expects exactly one argument, got {}", args.len()),
            ));
        };

        let component: Value = if let Some(literal) = checked_literal(arg)? {
            json!({ "text": literal.to_string() })
        } else {
            match arg {
                Node::String { value, .. } => json!({ "text": value }),
                Node::VarAccess { name, .. } => json!({
                    "score": { "name": name, "objective": VARS_OBJECTIVE }
                }),
                Node::BinOp { .. } | Node::UnaryOp { .. } => {
                    state.reset_registers();
                    self.lower_value(state, arg, out)?;
                    json!({
                        "score": {
                            "name": format!("t{}", state.result_depth),
                            "objective": TEMP_OBJECTIVE
                        }
                    })
                }
                other => {
                    return Err(CompileError::unsupported(
                        other.span(),
                        "unsupported print argument",
                    ));
                }
            }
        };

        out.push(format!("tellraw @a {component}"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::error::ErrorKind;
    use crate::processor::lexer::tokenize;
    use crate::processor::script_parser::parse;

    fn compile(src: &str) -> CompileResult<Artifacts> {
        let program = parse(tokenize(src).unwrap()).unwrap();
        generate(&program, "test")
    }

    fn lines_of(src: &str, artifact: &str) -> Vec<String> {
        let artifacts = compile(src).unwrap();
        artifacts
            .get(artifact)
            .unwrap_or_else(|| panic!("no artifact {artifact} in {artifacts:?}"))
            .lines
            .clone()
    }

    fn main_lines(body: &str) -> Vec<String> {
        lines_of(&format!("func main() {{\n{body}\n}}"), "main")
    }

    fn unsupported(src: &str) -> CompileError {
        let err = compile(src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedConstruct, "source: {src}");
        err
    }

    #[test]
    fn test_binary_assignment_registers() {
        assert_eq!(
            main_lines("x = 1 + 2"),
            vec![
                "scoreboard players set t0 MClangTemp 1",
                "scoreboard players set t1 MClangTemp 2",
                "scoreboard players operation t0 MClangTemp += t1 MClangTemp",
                "scoreboard players operation x MClangVars = t0 MClangTemp",
            ]
        );
    }

    #[test]
    fn test_nested_expression_registers() {
        assert_eq!(
            main_lines("x = (1 + 2) * (3 - y)"),
            vec![
                "scoreboard players set t0 MClangTemp 1",
                "scoreboard players set t1 MClangTemp 2",
                "scoreboard players operation t0 MClangTemp += t1 MClangTemp",
                "scoreboard players set t1 MClangTemp 3",
                "scoreboard players operation t2 MClangTemp = y MClangVars",
                "scoreboard players operation t1 MClangTemp -= t2 MClangTemp",
                "scoreboard players operation t0 MClangTemp *= t1 MClangTemp",
                "scoreboard players operation x MClangVars = t0 MClangTemp",
            ]
        );
    }

    #[test]
    fn test_simple_assignments() {
        let test_cases = vec![
            ("x = 5", "scoreboard players set x MClangVars 5"),
            ("x = -5", "scoreboard players set x MClangVars -5"),
            ("x = 1.5", "scoreboard players set x MClangVars 1.5"),
            (
                "x = y",
                "scoreboard players operation x MClangVars = y MClangVars",
            ),
        ];

        for (body, expected) in test_cases {
            assert_eq!(main_lines(body), vec![expected], "body: {body}");
        }
    }

    #[test]
    fn test_integer_range_checked_after_sign() {
        let test_cases = vec![
            ("x = -2147483648", "scoreboard players set x MClangVars -2147483648"),
            ("x = 2147483647", "scoreboard players set x MClangVars 2147483647"),
            ("print(-2147483648)", r#"tellraw @a {"text":"-2147483648"}"#),
        ];
        for (body, expected) in test_cases {
            assert_eq!(main_lines(body), vec![expected], "body: {body}");
        }

        let rejected = vec![
            "x = 2147483648",
            "x = - -2147483648",
            "x = a + 2147483648",
            "print(2147483648)",
        ];
        for body in rejected {
            let err = compile(&format!("func main() {{\n{body}\n}}")).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidSyntax, "body: {body}");
            assert_eq!(err.detail.as_deref(), Some("integer literal out of range"));
        }
    }

    #[test]
    fn test_negated_expression() {
        assert_eq!(
            main_lines("x = -y"),
            vec![
                "scoreboard players set t0 MClangTemp 0",
                "scoreboard players operation t1 MClangTemp = y MClangVars",
                "scoreboard players operation t0 MClangTemp -= t1 MClangTemp",
                "scoreboard players operation x MClangVars = t0 MClangTemp",
            ]
        );
    }

    #[test]
    fn test_assignment_resets_stale_result_depth() {
        let program = parse(tokenize("x = a * 2").unwrap()).unwrap();
        let Node::VarAssign { name, value, .. } = &program.body[0] else {
            panic!("expected assignment");
        };

        let mut generator = Generator::new("test", BTreeSet::new());
        let mut state = LoweringState {
            temp_depth: 3,
            result_depth: 5,
            ..LoweringState::default()
        };
        let mut out = Vec::new();
        generator
            .lower_assign(&mut state, name, value, &mut out)
            .unwrap();

        assert_eq!(
            out.last().unwrap(),
            "scoreboard players operation x MClangVars = t0 MClangTemp"
        );
        assert_eq!(out[0], "scoreboard players operation t0 MClangTemp = a MClangVars");
        assert_eq!(state.temp_depth, 0);
        assert_eq!(state.result_depth, 0);
    }

    #[test]
    fn test_depth_returns_to_zero_between_statements() {
        let lines = main_lines("x = 1 + (2 * (3 - 4))\ny = 5 + 6");
        assert_eq!(lines[lines.len() - 4], "scoreboard players set t0 MClangTemp 5");
        assert_eq!(
            lines.last().unwrap(),
            "scoreboard players operation y MClangVars = t0 MClangTemp"
        );
    }

    #[test]
    fn test_if_splits_into_synthetic_block() {
        let artifacts = compile("func main() {\n  if a == b { x = 1 }\n}").unwrap();

        assert_eq!(
            artifacts["if_1"].lines,
            vec!["scoreboard players set x MClangVars 1"]
        );

        let main = &artifacts["main"].lines;
        assert_eq!(
            main,
            &vec![
                "scoreboard players operation t0 MClangTemp = a MClangVars",
                "scoreboard players operation t1 MClangTemp = b MClangVars",
                "execute if score t0 MClangTemp = t1 MClangTemp run function test:if_1",
            ]
        );
        let invocations = main.iter().filter(|l| l.contains("run function")).count();
        assert_eq!(invocations, 1);
    }

    #[test]
    fn test_condition_polarity() {
        let test_cases = vec![
            ("if a == b {}", "execute if score"),
            ("if a != b {}", "execute unless score"),
            ("if not a == b {}", "execute unless score"),
            ("if not a != b {}", "execute if score"),
            ("if ! a == b {}", "execute unless score"),
            ("if not not a == b {}", "execute if score"),
        ];

        for (body, prefix) in test_cases {
            let lines = main_lines(body);
            assert!(
                lines.last().unwrap().starts_with(prefix),
                "body: {body}, got {lines:?}"
            );
        }
    }

    #[test]
    fn test_negate_flag_resets_after_comparison() {
        let lines = main_lines("if not a == b {}\nif a == b {}");
        let guards: Vec<&String> = lines.iter().filter(|l| l.starts_with("execute")).collect();
        assert!(guards[0].starts_with("execute unless score"));
        assert!(guards[0].ends_with("test:if_1"));
        assert!(guards[1].starts_with("execute if score"));
        assert!(guards[1].ends_with("test:if_2"));
    }

    #[test]
    fn test_truthiness_condition() {
        assert_eq!(
            main_lines("if x {}"),
            vec![
                "scoreboard players operation t0 MClangTemp = x MClangVars",
                "execute unless score t0 MClangTemp matches 0 run function test:if_1",
            ]
        );
        assert_eq!(
            main_lines("if not x - 1 {}").last().unwrap(),
            "execute if score t0 MClangTemp matches 0 run function test:if_1"
        );
    }

    #[test]
    fn test_block_counter_is_monotonic() {
        let src = "func a() { if x == 1 { if y == 2 { z = 3 } } }\nfunc b() { if x == 2 { z = 4 } }";
        let artifacts = compile(src).unwrap();

        assert_eq!(
            artifacts["if_1"].lines.last().unwrap(),
            "execute if score t0 MClangTemp = t1 MClangTemp run function test:if_2"
        );
        assert_eq!(artifacts["if_2"].lines, vec!["scoreboard players set z MClangVars 3"]);
        assert_eq!(artifacts["if_3"].lines, vec!["scoreboard players set z MClangVars 4"]);
        assert!(artifacts["b"].lines.last().unwrap().ends_with("test:if_3"));
    }

    #[test]
    fn test_calls_and_print() {
        let src = "func main() {\n  helper()\n  print(42)\n  print(\"hi\")\n  print(x)\n  print(x + 1)\n}\nfunc helper() {}";
        let artifacts = compile(src).unwrap();

        assert_eq!(artifacts["helper"].text(), "");
        assert_eq!(
            artifacts["main"].lines,
            vec![
                "function test:helper",
                r#"tellraw @a {"text":"42"}"#,
                r#"tellraw @a {"text":"hi"}"#,
                r#"tellraw @a {"score":{"name":"x","objective":"MClangVars"}}"#,
                "scoreboard players operation t0 MClangTemp = x MClangVars",
                "scoreboard players set t1 MClangTemp 1",
                "scoreboard players operation t0 MClangTemp += t1 MClangTemp",
                r#"tellraw @a {"score":{"name":"t0","objective":"MClangTemp"}}"#,
            ]
        );
    }

    #[test]
    fn test_forward_calls_resolve() {
        let lines = lines_of("func a() { b() }\nfunc b() {}", "a");
        assert_eq!(lines, vec!["function test:b"]);
    }

    #[test]
    fn test_unsupported_constructs() {
        let test_cases = vec![
            ("func main() { print() }", "print expects exactly one argument, got 0"),
            ("func main() { print(1, 2) }", "print expects exactly one argument, got 2"),
            ("func main() { missing() }", "call to undefined function `missing`"),
            ("x = 1", "statements must be inside a function"),
            ("func main() { func inner() {} }", "nested function declarations are not supported"),
            ("func a() {}\nfunc a() {}", "function `a` is declared twice"),
            ("func print() {}", "function `print` shadows a builtin"),
            ("func main() { x = \"s\" }", "strings can only be printed"),
            ("func main() { x = a == b }", "comparisons can only be used as if conditions"),
            ("func main() { x = 1 + (a == b) }", "comparisons can only be used as if conditions"),
            ("func main() { print(a != 1) }", "comparisons can only be used as if conditions"),
            ("func main() { if (a == b) == c {} }", "comparisons can only be used as if conditions"),
            ("func main() { x = not a }", "`not` can only be used in if conditions"),
            ("func main() { x = -\"s\" }", "strings can only be printed"),
        ];

        for (src, message) in test_cases {
            let err = unsupported(src);
            assert_eq!(err.detail.as_deref(), Some(message), "source: {src}");
        }
    }

    #[test]
    fn test_error_points_at_offending_call() {
        let err = unsupported("func main() {\n  print(1, 2)\n}");
        assert_eq!(err.span.start.line, 1);
        assert_eq!(err.span.start.column, 2);
    }

    /// `main` assigning a left-deep sum of `terms` variables to `x`.
    fn chain_program(terms: usize) -> Block {
        let span = Span::default();
        let leaf = || Node::VarAccess {
            name: "a".into(),
            span,
        };
        let mut value = leaf();
        for _ in 1..terms {
            value = Node::BinOp {
                left: Box::new(value),
                op: BinOp::Add,
                right: Box::new(leaf()),
                span,
            };
        }
        let assign = Node::VarAssign {
            name: "x".into(),
            value: Box::new(value),
            span,
        };
        Block {
            body: vec![Node::FunctionDecl {
                name: "main".into(),
                body: Block {
                    body: vec![assign],
                    span,
                },
                span,
            }],
            span,
        }
    }

    #[test]
    fn test_long_chains_hit_nesting_limit() {
        let err = generate(&chain_program(400), "test").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NestingTooDeep);

        let artifacts = generate(&chain_program(20), "test").unwrap();
        assert_eq!(artifacts["main"].lines.len(), 1 + 19 * 2 + 1);
    }

    #[test]
    fn test_generation_is_per_compile() {
        let src = "func main() { if a == 1 { b = 2 } }";
        assert_eq!(compile(src).unwrap(), compile(src).unwrap());
        assert!(compile(src).unwrap().contains_key("if_1"));
    }
}
