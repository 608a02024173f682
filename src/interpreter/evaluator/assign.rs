use crate::{
    ast::{Node, NodeKind},
    interpreter::{
        evaluator::{
            core::{Context, EvalResult, attribute_path, dangling, variable_not_found},
            scope::Scope,
        },
        value::core::Value,
    },
};

impl Context {
    /// Evaluates `target = value`.
    ///
    /// The right side is evaluated first. The target is then resolved in
    /// the scope chain and, failing that, in the globals:
    ///
    /// - a constant variable ignores the write;
    /// - a variable holding a pointer writes into the pointed-at variable;
    /// - any other variable is overwritten.
    ///
    /// Attribute targets (`a.b.c = v`) walk the chain and write the last
    /// attribute. When the chain starts at a constant variable the write is
    /// ignored.
    ///
    /// # Returns
    /// The assigned value, whether or not it was stored.
    ///
    /// # Errors
    /// - `RuntimeError::VariableNotFound` when the target (or the base of an
    ///   attribute chain) is not declared.
    /// - `RuntimeError::DanglingPointer` when writing through a pointer to a
    ///   purged variable.
    pub(crate) fn eval_assign(&self,
                              target: &Node,
                              value: &Node,
                              scope: &Scope,
                              depth: usize)
                              -> EvalResult<Value> {
        let value = self.eval_value(value, scope, depth)?;
        match &target.kind {
            NodeKind::Variable(name) => self.assign_variable(name, target, value, scope),
            NodeKind::GetAttr { base, attribute } => {
                self.assign_attribute(base, attribute, target, value, scope, depth)
            },
            // the parser rejects every other target
            _ => Ok(value),
        }
    }

    fn assign_variable(&self,
                       name: &str,
                       target: &Node,
                       value: Value,
                       scope: &Scope)
                       -> EvalResult<Value> {
        let cell = self.resolve(name, scope).ok_or_else(|| variable_not_found(name, target))?;
        let pointer = {
            let mut cell = cell.borrow_mut();
            if cell.is_const {
                return Ok(value);
            }
            match &cell.value {
                Value::Pointer(pointer) => pointer.clone(),
                _ => {
                    cell.value = value.clone();
                    return Ok(value);
                },
            }
        };

        let pointee = pointer.target().map_err(|_| dangling(target))?;
        let mut pointee = pointee.borrow_mut();
        if !pointee.is_const {
            pointee.value = value.clone();
        }
        Ok(value)
    }

    fn assign_attribute(&self,
                        base: &Node,
                        attribute: &Node,
                        target: &Node,
                        value: Value,
                        scope: &Scope,
                        depth: usize)
                        -> EvalResult<Value> {
        let owner = match base.variable_name() {
            Some(name) => {
                let cell = self.resolve(name, scope).ok_or_else(|| variable_not_found(name, base))?;
                let cell = cell.borrow();
                if cell.is_const {
                    return Ok(value);
                }
                cell.value.clone()
            },
            None => self.eval_value(base, scope, depth)?,
        };

        let path = attribute_path(attribute);
        let Some((last, parents)) = path.split_last() else {
            return Ok(value);
        };
        let mut owner = owner;
        for name in parents {
            owner = owner.get_attribute(name).map_err(|_| dangling(target))?;
        }
        owner.set_attribute(last, value.clone()).map_err(|_| dangling(target))?;
        Ok(value)
    }
}
