//! Verilog IR.
//!
//! Generators build these records; the `Display` impls here are the only place Verilog text is produced.

use std::fmt;

use itertools::Itertools;

use crate::utils::{indent, indent_hanging};

const INDENT: usize = 4;

/// Generated netlist.
///
/// The body continues a top-level module whose header is supplied by the board template, so it is
/// followed by `endmodule` and then by standalone modules.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Netlist {
    /// Items of the enclosing top-level module.
    pub body: Vec<ModuleItem>,

    /// Standalone modules.
    pub modules: Vec<Module>,
}

impl fmt::Display for Netlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", gen_verilog_module(&self.body))?;
        writeln!(f, "\nendmodule")?;
        for module in &self.modules {
            writeln!(f, "\n{}", module)?;
        }
        Ok(())
    }
}

/// Module.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Module {
    /// Module name.
    pub name: String,

    /// Port declarations.
    pub port_decls: Vec<PortDeclaration>,

    /// Module items.
    pub module_items: Vec<ModuleItem>,
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "module {}\n(\n{}\n);\n\n{}\n\nendmodule",
            self.name,
            indent(self.port_decls.iter().join(",\n"), INDENT),
            gen_verilog_module(&self.module_items)
        )
    }
}

/// Module item.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ModuleItem {
    /// Declarations.
    Declarations(Vec<Declaration>),

    /// Continuous assignments.
    ContinuousAssigns(Vec<ContinuousAssign>),

    /// Module instantiation.
    ModuleInstantiation(ModuleInstantiation),

    /// Items preceded by a line comment.
    Commented(String, Vec<ModuleItem>),
}

impl fmt::Display for ModuleItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declarations(decls) => write!(f, "{}", decls.iter().join("\n")),
            Self::ContinuousAssigns(conts) => write!(f, "{}", conts.iter().join("\n")),
            Self::ModuleInstantiation(module_inst) => write!(f, "{}", module_inst),
            Self::Commented(comment, items) => write!(f, "// {}\n{}", comment, items.iter().join("\n")),
        }
    }
}

/// Generates Verilog code for module items.
pub fn gen_verilog_module(module: &[ModuleItem]) -> String { module.iter().join("\n\n") }

/// Port declaration.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum PortDeclaration {
    /// Input declaration.
    Input(usize, String),

    /// Output declaration.
    Output(usize, String),
}

impl fmt::Display for PortDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (dir, width, ident) = match self {
            Self::Input(width, ident) => ("input", width, ident),
            Self::Output(width, ident) => ("output", width, ident),
        };
        if *width > 1 {
            write!(f, "{} wire [{}-1:0] {}", dir, width, ident)
        } else {
            write!(f, "{} wire {}", dir, ident)
        }
    }
}

impl PortDeclaration {
    /// Creates new input port declaration.
    pub fn input(width: usize, ident: &str) -> Self { Self::Input(width, ident.to_string()) }

    /// Creates new output port declaration.
    pub fn output(width: usize, ident: &str) -> Self { Self::Output(width, ident.to_string()) }
}

/// Declaration.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Declaration {
    /// Net declaration.
    Net(usize, String),

    /// Tri-state bus declaration. Any nonzero width is a vector, so `[0]` selects are always legal; width 0
    /// declares a scalar.
    Tri(usize, String),
}

impl Declaration {
    /// Net declaration.
    #[inline]
    pub fn net(width: usize, ident: String) -> Self { Declaration::Net(width, ident) }

    /// Tri-state net declaration.
    #[inline]
    pub fn tri(width: usize, ident: String) -> Self { Declaration::Tri(width, ident) }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, vector, width, ident) = match self {
            Self::Net(width, ident) => ("wire", *width > 1, width, ident),
            Self::Tri(width, ident) => ("tri", *width > 0, width, ident),
        };
        if vector {
            write!(f, "{} [{}-1:0] {};", kind, width, ident)
        } else {
            write!(f, "{} {};", kind, ident)
        }
    }
}

/// Continuous assign.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ContinuousAssign(pub Expression, pub Expression);

impl fmt::Display for ContinuousAssign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "assign {} = {};", self.0, indent_hanging(self.1.to_string(), INDENT))
    }
}

impl ContinuousAssign {
    /// Creates new continuous assign.
    pub fn new(lvalue: Expression, expr: Expression) -> Self { Self(lvalue, expr) }
}

/// Module instantiation with ports connected by position.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ModuleInstantiation {
    /// Module name.
    pub module_name: String,

    /// Inst name.
    pub inst_name: String,

    /// Port connections.
    pub port_connections: Vec<Expression>,
}

impl fmt::Display for ModuleInstantiation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}({});", self.module_name, self.inst_name, self.port_connections.iter().join(", "))
    }
}

impl ModuleInstantiation {
    /// Creates new module instantiation.
    pub fn new(module_name: String, inst_name: String, port_connections: Vec<Expression>) -> Self {
        Self { module_name, inst_name, port_connections }
    }
}

/// Binary operator.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum BinaryOp {
    /// Bitwise or.
    Or,

    /// Equality.
    Eq,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Or => write!(f, "|"),
            Self::Eq => write!(f, "=="),
        }
    }
}

/// Expression.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Expression {
    /// Primary.
    Primary(Primary),

    /// Binary expression.
    Binary(Box<Expression>, BinaryOp, Box<Expression>),

    /// Reduction of one or more terms, one term per line.
    Reduction(BinaryOp, Vec<Expression>),

    /// Conditional expression.
    Conditional(Box<Expression>, Box<Expression>, Box<Expression>),
}

/// Range.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Range {
    /// Index: `[index]`
    Index(usize),

    /// Part select: `[msb:lsb]`
    Part(usize, usize),
}

/// Primary.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Primary {
    /// Number.
    Number(String),

    /// Hierarchical identifier.
    HierarchicalIdentifier(String, Option<Range>),

    /// Mintypmax expression.
    MintypmaxExpression(Box<Expression>),
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary(prim) => write!(f, "{}", prim),
            Self::Binary(lhs, op, rhs) => write!(f, "{} {} {}", lhs, op, rhs),
            Self::Reduction(op, terms) => write!(f, "{}", terms.iter().join(&format!(" {}\n", op))),
            Self::Conditional(cond, then_expr, else_expr) => {
                if matches!(**else_expr, Self::Conditional(..)) {
                    write!(f, "{} ? {} :\n{}", cond, then_expr, else_expr)
                } else {
                    write!(f, "{} ? {} : {}", cond, then_expr, else_expr)
                }
            }
        }
    }
}

impl From<String> for Expression {
    fn from(ident: String) -> Self { Expression::ident(ident) }
}

impl From<&str> for Expression {
    fn from(ident: &str) -> Self { Expression::ident(ident.to_string()) }
}

impl Expression {
    /// Number.
    pub fn number(num: String) -> Self { Self::Primary(Primary::Number(num)) }

    /// Sized hexadecimal number, zero-padded to the width.
    pub fn hex(width: usize, value: usize) -> Self {
        Self::number(format!("{}'h{:0digits$x}", width, value, digits = (width + 3) / 4))
    }

    /// Sized binary number.
    pub fn bin(width: usize, value: usize) -> Self {
        Self::number(format!("{}'b{:0digits$b}", width, value, digits = width))
    }

    /// Unsized decimal number.
    pub fn decimal(value: usize) -> Self { Self::number(value.to_string()) }

    /// Identifier.
    pub fn ident(ident: String) -> Self { Self::Primary(Primary::HierarchicalIdentifier(ident, None)) }

    /// Adds a range to an identifier.
    pub fn with_range(self, range: Range) -> Self {
        if let Expression::Primary(Primary::HierarchicalIdentifier(ident, None)) = self {
            Expression::Primary(Primary::HierarchicalIdentifier(ident, Some(range)))
        } else {
            panic!("with_range: self is not an identifier")
        }
    }

    /// Bit select.
    pub fn index(self, index: usize) -> Self { self.with_range(Range::Index(index)) }

    /// Part select.
    pub fn part(self, msb: usize, lsb: usize) -> Self { self.with_range(Range::Part(msb, lsb)) }

    /// Mintypmax expression.
    pub fn mintypmax_expr(expr: Expression) -> Self { Self::Primary(Primary::MintypmaxExpression(Box::new(expr))) }

    /// Binary operation.
    pub fn binary(op: BinaryOp, lhs: Expression, rhs: Expression) -> Self {
        // Operands of binary operation should be primary.
        Self::Binary(Box::new(lhs.into_primary()), op, Box::new(rhs.into_primary()))
    }

    /// Reduction of `terms` with `op`. A single term is returned as is.
    pub fn reduce<I>(op: BinaryOp, terms: I) -> Self
    where I: IntoIterator<Item = Expression> {
        let mut terms = terms.into_iter().collect::<Vec<_>>();
        assert!(!terms.is_empty(), "reduce: no terms");
        if terms.len() == 1 {
            terms.remove(0)
        } else {
            Self::Reduction(op, terms)
        }
    }

    /// Conditional expression. The condition is parenthesized when it is not primary.
    pub fn conditional(cond: Expression, then_expr: Expression, else_expr: Expression) -> Self {
        Self::Conditional(Box::new(cond.into_primary()), Box::new(then_expr), Box::new(else_expr))
    }

    /// Returns `true` if the expression is primary.
    pub fn is_primary(&self) -> bool { matches!(self, Self::Primary(_)) }

    /// Converts into primary.
    #[must_use]
    pub fn into_primary(self) -> Self {
        if self.is_primary() {
            self
        } else {
            Self::mintypmax_expr(self)
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{}", index),
            Self::Part(msb, lsb) => write!(f, "{}:{}", msb, lsb),
        }
    }
}

impl fmt::Display for Primary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(num) => write!(f, "{}", num),
            Self::HierarchicalIdentifier(ident, Some(range)) => write!(f, "{}[{}]", ident, range),
            Self::HierarchicalIdentifier(ident, None) => write!(f, "{}", ident),
            Self::MintypmaxExpression(expr) => write!(f, "({})", expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers() {
        assert_eq!(Expression::hex(4, 0xe).to_string(), "4'he");
        assert_eq!(Expression::hex(16, 47).to_string(), "16'h002f");
        assert_eq!(Expression::bin(1, 1).to_string(), "1'b1");
        assert_eq!(Expression::decimal(12).to_string(), "12");
    }

    #[test]
    fn declarations() {
        assert_eq!(Declaration::net(1, "p01STB_O".to_string()).to_string(), "wire p01STB_O;");
        assert_eq!(Declaration::net(8, "p01DAT_I".to_string()).to_string(), "wire [8-1:0] p01DAT_I;");
        assert_eq!(Declaration::tri(4, "p01pins".to_string()).to_string(), "tri [4-1:0] p01pins;");
        assert_eq!(Declaration::tri(1, "p01pins".to_string()).to_string(), "tri [1-1:0] p01pins;");
        assert_eq!(Declaration::tri(0, "p01pins".to_string()).to_string(), "tri p01pins;");
    }

    #[test]
    fn selects_and_conditionals() {
        let decode = Expression::conditional(
            Expression::binary(BinaryOp::Eq, Expression::from("bi0addr").part(11, 8), Expression::decimal(3)),
            Expression::bin(1, 1),
            Expression::bin(1, 0),
        );
        let assign = ContinuousAssign::new(Expression::from("p03STB_O"), decode);
        assert_eq!(assign.to_string(), "assign p03STB_O = (bi0addr[11:8] == 3) ? 1'b1 : 1'b0;");

        let pin = ContinuousAssign::new(Expression::from("PCPIN").index(9), Expression::from("p02pins").index(1));
        assert_eq!(pin.to_string(), "assign PCPIN[9] = p02pins[1];");
    }

    #[test]
    fn reductions() {
        let one = Expression::reduce(BinaryOp::Or, [Expression::from("a")]);
        assert_eq!(ContinuousAssign::new("x".into(), one).to_string(), "assign x = a;");

        let three = Expression::reduce(BinaryOp::Or, ["a", "b", "c"].map(Expression::from));
        assert_eq!(ContinuousAssign::new("x".into(), three).to_string(), "assign x = a |\n    b |\n    c;");
    }

    #[test]
    fn nested_conditionals_one_arm_per_line() {
        let expr = Expression::conditional(
            Expression::from("s0"),
            Expression::decimal(1),
            Expression::conditional(Expression::from("s1"), Expression::decimal(2), Expression::decimal(0)),
        );
        assert_eq!(ContinuousAssign::new("y".into(), expr).to_string(), "assign y = s0 ? 1 :\n    s1 ? 2 : 0;");
    }

    #[test]
    fn instantiation_and_module() {
        let inst = ModuleInstantiation::new("out4".to_string(), "p01".to_string(), vec![
            "CLK_O".into(),
            Expression::from("ADR_O").part(7, 0),
            "p01pins".into(),
        ]);
        assert_eq!(inst.to_string(), "out4 p01(CLK_O, ADR_O[7:0], p01pins);");

        let module = Module {
            name: "m".to_string(),
            port_decls: vec![PortDeclaration::input(4, "a"), PortDeclaration::output(1, "b")],
            module_items: vec![ModuleItem::ContinuousAssigns(vec![ContinuousAssign::new("b".into(), "a".into())])],
        };
        assert_eq!(
            module.to_string(),
            "module m\n(\n    input wire [4-1:0] a,\n    output wire b\n);\n\nassign b = a;\n\nendmodule"
        );
    }

    #[test]
    fn netlist_closes_top_module() {
        let netlist = Netlist {
            body: vec![ModuleItem::Commented("Slot: 0".to_string(), vec![ModuleItem::Declarations(vec![
                Declaration::net(1, "w".to_string()),
            ])])],
            modules: vec![],
        };
        assert_eq!(netlist.to_string(), "// Slot: 0\nwire w;\n\nendmodule\n");
    }
}
