//! Conditional visibility for widgets
//!
//! A widget's `when` condition is given in one of several forms and resolved
//! once, at construction, into a [`Predicate`]. Evaluation is pure: the same
//! data and context always give the same answer, and a missing key never
//! fails, it just reads as falsy.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::sync::Arc;

use serde_json::Value;

use crate::data::{field_is_truthy, Data};
use crate::event::RenderContext;

type PredicateFn = dyn Fn(&Data, Option<&str>, &RenderContext) -> bool + Send + Sync;

/// Resolved visibility check: `(data, widget id, context) -> bool`
#[derive(Clone)]
pub struct Predicate(Arc<PredicateFn>);

impl Predicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Data, Option<&str>, &RenderContext) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn always() -> Self {
        Self::new(|_, _, _| true)
    }

    pub fn eval(&self, data: &Data, widget_id: Option<&str>, ctx: &RenderContext) -> bool {
        (self.0)(data, widget_id, ctx)
    }
}

impl Default for Predicate {
    fn default() -> Self {
        Self::always()
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// Condition forms accepted by widget constructors
#[derive(Debug, Clone, Default)]
pub enum When {
    /// No condition
    #[default]
    Always,
    /// Key must hold a truthy value
    Field(String),
    /// Key must be falsy or missing
    NotField(String),
    /// Field expression over the data mapping
    Expr(Expr),
    /// Arbitrary caller-supplied check
    Predicate(Predicate),
    /// Every sub-condition must hold; stops at the first false
    All(Vec<When>),
}

impl When {
    /// Collapse this condition into a single callable
    pub fn resolve(self) -> Predicate {
        match self {
            When::Always => Predicate::always(),
            When::Field(key) => Predicate::new(move |data, _, _| field_is_truthy(data, &key)),
            When::NotField(key) => Predicate::new(move |data, _, _| !field_is_truthy(data, &key)),
            When::Expr(expr) => Predicate::new(move |data, _, _| expr.eval(data)),
            When::Predicate(p) => p,
            When::All(conds) => {
                let preds: Vec<Predicate> = conds.into_iter().map(When::resolve).collect();
                Predicate::new(move |data, id, ctx| preds.iter().all(|p| p.eval(data, id, ctx)))
            }
        }
    }
}

impl From<&str> for When {
    fn from(key: &str) -> Self {
        When::Field(key.to_string())
    }
}

impl From<String> for When {
    fn from(key: String) -> Self {
        When::Field(key)
    }
}

impl From<Expr> for When {
    fn from(expr: Expr) -> Self {
        When::Expr(expr)
    }
}

impl From<Predicate> for When {
    fn from(p: Predicate) -> Self {
        When::Predicate(p)
    }
}

impl<T: Into<When>> From<Option<T>> for When {
    fn from(cond: Option<T>) -> Self {
        cond.map(Into::into).unwrap_or_default()
    }
}

/// Visible iff `key` is falsy or missing
pub fn when_not(key: impl Into<String>) -> When {
    When::NotField(key.into())
}

/// Visible iff every condition holds
pub fn when_all<I, W>(conds: I) -> When
where
    I: IntoIterator<Item = W>,
    W: Into<When>,
{
    When::All(conds.into_iter().map(Into::into).collect())
}

/// Anything whose visibility is gated by a predicate
pub trait Whenable {
    fn predicate(&self) -> &Predicate;

    /// Id passed to the predicate; anonymous elements have none
    fn widget_id(&self) -> Option<&str> {
        None
    }

    fn is_visible(&self, data: &Data, ctx: &RenderContext) -> bool {
        self.predicate().eval(data, self.widget_id(), ctx)
    }
}

// ============================================================================
// Field expressions
// ============================================================================

/// Comparison operator in a field expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

/// Expression over the data mapping, built with [`Expr::field`]
///
/// ```
/// use chatdialog::when::Expr;
/// use serde_json::json;
///
/// let expr = Expr::field("count").gt(3) & !Expr::field("hidden").truthy();
/// let data = json!({"count": 5}).as_object().cloned().unwrap();
/// assert!(expr.eval(&data));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Truthy(String),
    Cmp { field: String, op: CmpOp, value: Value },
    In { field: String, values: Vec<Value> },
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

/// Field reference used to build expressions
#[derive(Debug, Clone)]
pub struct FieldRef(String);

impl Expr {
    pub fn field(name: impl Into<String>) -> FieldRef {
        FieldRef(name.into())
    }

    pub fn eval(&self, data: &Data) -> bool {
        match self {
            Expr::Truthy(field) => field_is_truthy(data, field),
            Expr::Cmp { field, op, value } => {
                let actual = data.get(field).unwrap_or(&Value::Null);
                match op {
                    CmpOp::Eq => values_equal(actual, value),
                    CmpOp::Ne => !values_equal(actual, value),
                    CmpOp::Gt => compare(actual, value) == Some(Ordering::Greater),
                    CmpOp::Ge => matches!(
                        compare(actual, value),
                        Some(Ordering::Greater | Ordering::Equal)
                    ),
                    CmpOp::Lt => compare(actual, value) == Some(Ordering::Less),
                    CmpOp::Le => matches!(
                        compare(actual, value),
                        Some(Ordering::Less | Ordering::Equal)
                    ),
                }
            }
            Expr::In { field, values } => {
                let actual = data.get(field).unwrap_or(&Value::Null);
                values.iter().any(|v| values_equal(actual, v))
            }
            Expr::Not(inner) => !inner.eval(data),
            Expr::And(a, b) => a.eval(data) && b.eval(data),
            Expr::Or(a, b) => a.eval(data) || b.eval(data),
        }
    }
}

impl FieldRef {
    fn cmp(self, op: CmpOp, value: impl Into<Value>) -> Expr {
        Expr::Cmp {
            field: self.0,
            op,
            value: value.into(),
        }
    }

    pub fn truthy(self) -> Expr {
        Expr::Truthy(self.0)
    }

    pub fn eq(self, value: impl Into<Value>) -> Expr {
        self.cmp(CmpOp::Eq, value)
    }

    pub fn ne(self, value: impl Into<Value>) -> Expr {
        self.cmp(CmpOp::Ne, value)
    }

    pub fn gt(self, value: impl Into<Value>) -> Expr {
        self.cmp(CmpOp::Gt, value)
    }

    pub fn ge(self, value: impl Into<Value>) -> Expr {
        self.cmp(CmpOp::Ge, value)
    }

    pub fn lt(self, value: impl Into<Value>) -> Expr {
        self.cmp(CmpOp::Lt, value)
    }

    pub fn le(self, value: impl Into<Value>) -> Expr {
        self.cmp(CmpOp::Le, value)
    }

    pub fn is_in<I, V>(self, values: I) -> Expr
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Expr::In {
            field: self.0,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

impl BitAnd for Expr {
    type Output = Expr;

    fn bitand(self, rhs: Expr) -> Expr {
        Expr::And(Box::new(self), Box::new(rhs))
    }
}

impl BitOr for Expr {
    type Output = Expr;

    fn bitor(self, rhs: Expr) -> Expr {
        Expr::Or(Box::new(self), Box::new(rhs))
    }
}

/// Numbers compare by value so `1` equals `1.0`
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
