use std::cmp::Ordering;

use crate::ast::{BinaryOperator, DeclaredType, Expression, Spanned, Statement, UnaryOperator};
use crate::event::Event;

use super::coerce::coerce;
use super::context::{Context, Frame};
use super::{RuntimeError, RuntimeResult, Value};

/// Control-flow marker for statement execution. `Return(None)` is a bare
/// `return`.
pub(super) enum Flow {
    Continue,
    Return(Option<Value>),
}

/// Tree-walking executor over an explicit [`Context`].
pub(super) struct Evaluator<'a> {
    context: &'a mut Context,
}

impl<'a> Evaluator<'a> {
    pub(super) fn new(context: &'a mut Context) -> Self {
        Self { context }
    }

    pub(super) fn exec_block(&mut self, body: &[Spanned<Statement>]) -> RuntimeResult<Flow> {
        for statement in body {
            if let Flow::Return(value) = self.exec_statement(&statement.node)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Continue)
    }

    pub(super) fn exec_statement(&mut self, statement: &Statement) -> RuntimeResult<Flow> {
        match statement {
            Statement::Assign {
                name,
                declared,
                value,
            } => {
                let value = self.eval_expression(value)?;
                let target = declared.or_else(|| {
                    self.context
                        .scope()
                        .get(name)
                        .map(Value::value_type)
                        .filter(|existing| *existing != DeclaredType::Void)
                });
                let value = match target {
                    Some(target) => self.coerce(value, target)?,
                    None => value,
                };
                self.context.emit(Event::VariableCreated {
                    name: name.clone(),
                    value: value.clone(),
                });
                self.context.store(name.clone(), value);
            }
            Statement::Print(Expression::Variable(name)) => {
                let event = match self.context.lookup(name) {
                    Some(value) => Event::Printed {
                        name: Some(name.clone()),
                        value: value.clone(),
                    },
                    None => Event::VariableNotFound { name: name.clone() },
                };
                self.context.emit(event);
            }
            Statement::Print(expr) => {
                let value = self.eval_expression(expr)?;
                self.context.emit(Event::Printed { name: None, value });
            }
            Statement::Call { name, args } => {
                let value = self.call_function(name, args)?;
                if value != Value::Void {
                    self.context.emit(Event::FunctionReturned { value });
                }
            }
            Statement::Return(expr) => {
                if self.context.frame_depth() == 0 {
                    return Err(RuntimeError::ReturnOutsideFunction);
                }
                let value = match expr {
                    Some(expr) => Some(self.eval_expression(expr)?),
                    None => None,
                };
                return Ok(Flow::Return(value));
            }
            Statement::Expr(expr) => {
                self.eval_expression(expr)?;
            }
            // Structural only: bodies of these are not executed and nested
            // definitions are not registered.
            Statement::If { .. }
            | Statement::While { .. }
            | Statement::FunctionDef(_)
            | Statement::ClassDef(_) => {}
        }
        Ok(Flow::Continue)
    }

    pub(super) fn eval_expression(&mut self, expr: &Expression) -> RuntimeResult<Value> {
        match expr {
            Expression::Integer(value) => Ok(Value::Int(*value)),
            Expression::Float(value) => Ok(Value::Float(*value)),
            Expression::String(value) => Ok(Value::String(value.clone())),
            Expression::Boolean(value) => Ok(Value::Bool(*value)),
            Expression::Null => Ok(Value::Void),
            Expression::Variable(name) => self.context.lookup(name).cloned().ok_or_else(|| {
                RuntimeError::UndefinedVariable {
                    name: name.to_string(),
                }
            }),
            Expression::Unary { op, operand } => {
                let operand = self.eval_expression(operand)?;
                unary(*op, operand)
            }
            Expression::Binary { left, op, right } => match op {
                BinaryOperator::And | BinaryOperator::Or => self.eval_logical(*op, left, right),
                _ => {
                    let left = self.eval_expression(left)?;
                    let right = self.eval_expression(right)?;
                    if op.is_arithmetic() {
                        arithmetic(*op, left, right)
                    } else {
                        compare(*op, left, right)
                    }
                }
            },
            Expression::Call { name, args } => self.call_function(name, args),
        }
    }

    /// `&&` and `||` over bools, skipping the right side when the left decides.
    fn eval_logical(
        &mut self,
        op: BinaryOperator,
        left: &Expression,
        right: &Expression,
    ) -> RuntimeResult<Value> {
        let left = self.eval_expression(left)?;
        match (op, &left) {
            (BinaryOperator::And, Value::Bool(false)) => return Ok(Value::Bool(false)),
            (BinaryOperator::Or, Value::Bool(true)) => return Ok(Value::Bool(true)),
            _ => {}
        }
        let right = self.eval_expression(right)?;
        match (&left, &right) {
            (Value::Bool(_), Value::Bool(value)) => Ok(Value::Bool(*value)),
            _ => Err(mismatch(op, &left, &right)),
        }
    }

    fn call_function(&mut self, name: &str, args: &[Expression]) -> RuntimeResult<Value> {
        let function = self
            .context
            .function(name)
            .ok_or_else(|| RuntimeError::UndefinedFunction {
                name: name.to_string(),
            })?;
        if args.len() != function.params.len() {
            return Err(RuntimeError::ArityMismatch {
                name: name.to_string(),
                expected: function.params.len(),
                found: args.len(),
            });
        }

        // Arguments are evaluated in the caller's scope before the callee's
        // frame exists.
        let mut frame = Frame::default();
        let mut bound = Vec::with_capacity(args.len());
        for (param, arg) in function.params.iter().zip(args) {
            let value = self.eval_expression(arg)?;
            let value = self.coerce(value, param.declared)?;
            bound.push((param.name.clone(), value.clone()));
            frame.insert(param.name.clone(), value);
        }

        let limit = self.context.config.max_call_depth;
        if self.context.frame_depth() >= limit {
            return Err(RuntimeError::CallDepthExceeded {
                name: name.to_string(),
                limit,
            });
        }
        self.context.emit(Event::FunctionCalled {
            name: name.to_string(),
            arguments: bound,
        });

        let flow = self.with_frame(frame, |evaluator| evaluator.exec_block(&function.body))?;
        match flow {
            Flow::Return(Some(value)) if function.return_type != DeclaredType::Void => {
                self.coerce(value, function.return_type)
            }
            Flow::Return(_) | Flow::Continue => Ok(Value::Void),
        }
    }

    /// Runs `body` with `frame` on top of the stack and pops it on every exit.
    fn with_frame<T>(&mut self, frame: Frame, body: impl FnOnce(&mut Self) -> T) -> T {
        self.context.push_frame(frame);
        let result = body(self);
        self.context.pop_frame();
        result
    }

    fn coerce(&mut self, value: Value, target: DeclaredType) -> RuntimeResult<Value> {
        let coercion = coerce(value, target)?;
        if let Some(message) = coercion.warning {
            self.context.emit(Event::Warning { message });
        }
        Ok(coercion.value)
    }
}

fn unary(op: UnaryOperator, operand: Value) -> RuntimeResult<Value> {
    match (op, &operand) {
        (UnaryOperator::Negate, Value::Int(value)) => value
            .checked_neg()
            .map(Value::Int)
            .ok_or(RuntimeError::IntegerOverflow {
                operator: op.symbol(),
            }),
        (UnaryOperator::Negate, Value::Float(value)) => Ok(Value::Float(-value)),
        (UnaryOperator::Not, Value::Bool(value)) => Ok(Value::Bool(!value)),
        _ => Err(RuntimeError::UnaryTypeMismatch {
            operator: op.symbol(),
            operand: operand.value_type(),
        }),
    }
}

/// Integer `+ - *` stay in i64 with overflow checks. Everything else runs in
/// f64 and is normalised back to `Int` when the result is integral.
fn arithmetic(op: BinaryOperator, left: Value, right: Value) -> RuntimeResult<Value> {
    if let (Value::Int(a), Value::Int(b)) = (&left, &right) {
        let checked = match op {
            BinaryOperator::Add => Some(a.checked_add(*b)),
            BinaryOperator::Sub => Some(a.checked_sub(*b)),
            BinaryOperator::Mul => Some(a.checked_mul(*b)),
            _ => None,
        };
        if let Some(result) = checked {
            return result.map(Value::Int).ok_or(RuntimeError::IntegerOverflow {
                operator: op.symbol(),
            });
        }
    }

    let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) else {
        return Err(mismatch(op, &left, &right));
    };
    let result = match op {
        BinaryOperator::Add => a + b,
        BinaryOperator::Sub => a - b,
        BinaryOperator::Mul => a * b,
        BinaryOperator::Div => {
            if b == 0.0 {
                return Err(RuntimeError::DivisionByZero);
            }
            a / b
        }
        _ => return Err(mismatch(op, &left, &right)),
    };
    Ok(Value::normalized(result))
}

fn compare(op: BinaryOperator, left: Value, right: Value) -> RuntimeResult<Value> {
    if matches!(op, BinaryOperator::Equal | BinaryOperator::NotEqual) {
        let equal = match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => left == right,
        };
        return Ok(Value::Bool(equal == (op == BinaryOperator::Equal)));
    }

    let ordering = match (&left, &right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => return Err(mismatch(op, &left, &right)),
        },
    };
    let result = ordering.is_some_and(|ordering| match op {
        BinaryOperator::Less => ordering == Ordering::Less,
        BinaryOperator::LessEqual => ordering != Ordering::Greater,
        BinaryOperator::Greater => ordering == Ordering::Greater,
        _ => ordering != Ordering::Less,
    });
    Ok(Value::Bool(result))
}

fn mismatch(op: BinaryOperator, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::TypeMismatch {
        operator: op.symbol(),
        left: left.value_type(),
        right: right.value_type(),
    }
}
