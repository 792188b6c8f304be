//! Fluent construction of method bodies

use crate::features::ir::domain::{InvokeInstruction, InvokeKind, MethodBody, Statement, ValueId};
use crate::features::points_to::domain::ConstantValue;
use crate::shared::models::{FieldRef, MethodRef, TypeName};
use std::sync::Arc;

/// Appends statements and hands out fresh SSA values
///
/// ```
/// use callgraph_engine::features::ir::BodyBuilder;
/// use callgraph_engine::shared::models::MethodRef;
///
/// let mut b = BodyBuilder::new(0);
/// let name = b.string("java.lang.Integer");
/// let for_name = MethodRef::new(
///     "java.lang.Class",
///     "forName",
///     "(Ljava/lang/String;)Ljava/lang/Class;",
/// )
/// .unwrap();
/// let class = b.invoke_static(&for_name, &[name]);
/// b.ret(class);
/// assert_eq!(b.build().statements.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct BodyBuilder {
    param_count: u32,
    next_value: ValueId,
    statements: Vec<Statement>,
}

impl BodyBuilder {
    pub fn new(param_count: u32) -> Self {
        Self {
            param_count,
            next_value: param_count + 1,
            statements: Vec::new(),
        }
    }

    /// Builder for `method`, counting the receiver unless `is_static`
    pub fn for_method(method: &MethodRef, is_static: bool) -> Self {
        let receiver = u32::from(!is_static);
        Self::new(method.arity() as u32 + receiver)
    }

    /// Value of parameter `index` (0-based, receiver first)
    pub fn param(&self, index: u32) -> ValueId {
        index + 1
    }

    /// Index the next statement will get
    pub fn next_index(&self) -> u32 {
        self.statements.len() as u32
    }

    fn fresh(&mut self) -> ValueId {
        let v = self.next_value;
        self.next_value += 1;
        v
    }

    /// Value with no defining statement, standing for an unmodeled source
    pub fn opaque(&mut self) -> ValueId {
        self.fresh()
    }

    pub fn push(&mut self, statement: Statement) -> &mut Self {
        self.statements.push(statement);
        self
    }

    pub fn new_object(&mut self, ty: impl Into<TypeName>) -> ValueId {
        let def = self.fresh();
        self.push(Statement::New { def, ty: ty.into() });
        def
    }

    /// Array of `element` with an optionally known length
    pub fn new_array(&mut self, element: impl Into<TypeName>, length: Option<u32>) -> ValueId {
        let def = self.fresh();
        self.push(Statement::NewArray {
            def,
            ty: element.into().array_of(),
            length,
        });
        def
    }

    pub fn constant(&mut self, value: ConstantValue) -> ValueId {
        let def = self.fresh();
        self.push(Statement::Constant { def, value });
        def
    }

    pub fn string(&mut self, value: &str) -> ValueId {
        self.constant(ConstantValue::string(value))
    }

    pub fn class_literal(&mut self, ty: impl Into<TypeName>) -> ValueId {
        self.constant(ConstantValue::Class(ty.into()))
    }

    pub fn method_constant(&mut self, method: &MethodRef) -> ValueId {
        self.constant(ConstantValue::Method(method.clone()))
    }

    pub fn assign(&mut self, src: ValueId) -> ValueId {
        let def = self.fresh();
        self.push(Statement::Assign { def, src });
        def
    }

    pub fn phi(&mut self, srcs: &[ValueId]) -> ValueId {
        let def = self.fresh();
        self.push(Statement::Phi {
            def,
            srcs: srcs.to_vec(),
        });
        def
    }

    pub fn check_cast(&mut self, src: ValueId, ty: impl Into<TypeName>) -> ValueId {
        let def = self.fresh();
        self.push(Statement::CheckCast {
            def,
            src,
            ty: ty.into(),
        });
        def
    }

    pub fn get_field(&mut self, object: ValueId, field: &FieldRef) -> ValueId {
        let def = self.fresh();
        self.push(Statement::GetField {
            def,
            object,
            field: field.clone(),
        });
        def
    }

    pub fn put_field(&mut self, object: ValueId, field: &FieldRef, value: ValueId) {
        self.push(Statement::PutField {
            object,
            field: field.clone(),
            value,
        });
    }

    pub fn get_static(&mut self, field: &FieldRef) -> ValueId {
        let def = self.fresh();
        self.push(Statement::GetStatic {
            def,
            field: field.clone(),
        });
        def
    }

    pub fn put_static(&mut self, field: &FieldRef, value: ValueId) {
        self.push(Statement::PutStatic {
            field: field.clone(),
            value,
        });
    }

    pub fn array_load(&mut self, array: ValueId) -> ValueId {
        let def = self.fresh();
        self.push(Statement::ArrayLoad { def, array });
        def
    }

    pub fn array_store(&mut self, array: ValueId, value: ValueId) {
        self.push(Statement::ArrayStore { array, value });
    }

    /// Invoke with a result value; `def` is always allocated
    pub fn invoke(&mut self, kind: InvokeKind, target: &MethodRef, args: &[ValueId]) -> ValueId {
        let def = self.fresh();
        self.push(Statement::Invoke(InvokeInstruction {
            kind,
            target: target.clone(),
            args: args.to_vec(),
            def: Some(def),
            exception: None,
        }));
        def
    }

    pub fn invoke_static(&mut self, target: &MethodRef, args: &[ValueId]) -> ValueId {
        self.invoke(InvokeKind::Static, target, args)
    }

    pub fn invoke_special(&mut self, target: &MethodRef, args: &[ValueId]) -> ValueId {
        self.invoke(InvokeKind::Special, target, args)
    }

    pub fn invoke_virtual(&mut self, target: &MethodRef, args: &[ValueId]) -> ValueId {
        self.invoke(InvokeKind::Virtual, target, args)
    }

    pub fn invoke_interface(&mut self, target: &MethodRef, args: &[ValueId]) -> ValueId {
        self.invoke(InvokeKind::Interface, target, args)
    }

    /// Invoke inside a handler; returns (result, caught exception)
    pub fn invoke_with_handler(
        &mut self,
        kind: InvokeKind,
        target: &MethodRef,
        args: &[ValueId],
    ) -> (ValueId, ValueId) {
        let def = self.fresh();
        let exception = self.fresh();
        self.push(Statement::Invoke(InvokeInstruction {
            kind,
            target: target.clone(),
            args: args.to_vec(),
            def: Some(def),
            exception: Some(exception),
        }));
        (def, exception)
    }

    pub fn ret(&mut self, value: ValueId) {
        self.push(Statement::Return { value: Some(value) });
    }

    pub fn ret_void(&mut self) {
        self.push(Statement::Return { value: None });
    }

    pub fn throw(&mut self, value: ValueId) {
        self.push(Statement::Throw { value });
    }

    pub fn build(self) -> MethodBody {
        MethodBody::new(self.param_count, self.statements)
    }

    pub fn build_arc(self) -> Arc<MethodBody> {
        Arc::new(self.build())
    }
}
