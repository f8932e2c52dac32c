use cinder::bytecode::{
    Bytecode, CodeError, CompileError, Compiler, Instructions, OpCode, disassemble, lookup, make,
    read_operands,
};
use cinder::lang::node::{Block, Expression, InfixOperator, Program, Statement};
use cinder::lang::{Object, Scope};

#[test]
fn literal_five() {
    let bytecode = Compiler::new()
        .compile_expression(&Expression::Integer(5))
        .unwrap();

    assert_eq!(disassemble(&bytecode.instructions).unwrap(), "0000 CONST 0\n");
    assert_eq!(bytecode.constants, vec![Object::Integer(5)]);
}

#[test]
fn one_plus_two() {
    let expr = Expression::infix(
        InfixOperator::Add,
        Expression::Integer(1),
        Expression::Integer(2),
    );
    let bytecode = Compiler::new().compile_expression(&expr).unwrap();

    assert_eq!(
        disassemble(&bytecode.instructions).unwrap(),
        "0000 CONST 0\n0003 CONST 1\n0006 ADD\n"
    );
    assert_eq!(
        bytecode.constants,
        vec![Object::Integer(1), Object::Integer(2)]
    );
}

#[test]
fn true_equals_false() {
    let expr = Expression::infix(
        InfixOperator::Eq,
        Expression::Boolean(true),
        Expression::Boolean(false),
    );
    let bytecode = Compiler::new().compile_expression(&expr).unwrap();

    assert_eq!(
        disassemble(&bytecode.instructions).unwrap(),
        "0000 TRUE\n0001 FALSE\n0002 EQL\n"
    );
    assert!(bytecode.constants.is_empty());
}

#[test]
fn unbound_identifier_produces_no_bytecode() {
    let program = Program::new(vec![Statement::Block(Block::new(vec![
        Statement::Expression(Expression::Integer(1)),
        Statement::Expression(Expression::ident("ghost")),
    ]))]);

    match Compiler::new().compile_program(&program) {
        Err(CompileError::UndefinedIdentifier(name)) => assert_eq!(name, "ghost"),
        other => panic!("expected UndefinedIdentifier, got {:?}", other),
    }
}

#[test]
fn max_u16_operand_decodes() {
    let bytes = make(OpCode::Const, &[65535]).unwrap();
    let def = lookup(bytes[0]).unwrap();
    let (operands, read) = read_operands(def, &bytes[1..]).unwrap();

    assert_eq!(bytes, vec![1, 0xff, 0xff]);
    assert_eq!(operands, vec![65535]);
    assert_eq!(read, 2);
}

#[test]
fn offsets_advance_by_instruction_width() {
    let expr = Expression::infix(
        InfixOperator::Lt,
        Expression::infix(
            InfixOperator::Mul,
            Expression::Integer(2),
            Expression::String("x".to_string()),
        ),
        Expression::Boolean(true),
    );
    let bytecode = Compiler::new().compile_expression(&expr).unwrap();
    let decoded = bytecode.instructions.decode().unwrap();

    for pair in decoded.windows(2) {
        let width = pair[0].op.definition().instruction_len();
        assert_eq!(pair[1].offset, pair[0].offset + width);
    }
    assert_eq!(
        decoded.iter().map(|d| d.op).collect::<Vec<_>>(),
        vec![
            OpCode::Const,
            OpCode::Const,
            OpCode::Mul,
            OpCode::True,
            OpCode::Lt,
        ]
    );
}

#[test]
fn malformed_stream_is_rejected() {
    let truncated = Instructions::from(vec![OpCode::Const as u8, 0]);
    assert!(matches!(
        disassemble(&truncated),
        Err(CodeError::Truncated { .. })
    ));

    let unknown = Instructions::from(vec![0xee]);
    assert_eq!(disassemble(&unknown), Err(CodeError::UnknownOpcode(0xee)));
}

#[test]
fn compiled_program_survives_serialization() {
    let scope = Scope::root();
    scope.set("limit", Object::Integer(100));

    let program = Program::new(vec![
        Statement::Let {
            name: "name".to_string(),
            value: Expression::String("cinder".to_string()),
        },
        Statement::Expression(Expression::infix(
            InfixOperator::GtEq,
            Expression::ident("limit"),
            Expression::Integer(3),
        )),
        Statement::Expression(Expression::ident("name")),
    ]);
    let bytecode = Compiler::with_scope(scope)
        .compile_program(&program)
        .unwrap();

    let restored = Bytecode::from_bytes(&bytecode.to_bytes().unwrap()).unwrap();
    assert_eq!(restored, bytecode);
    assert_eq!(
        disassemble(&restored.instructions).unwrap(),
        "0000 CONST 0\n0003 CONST 1\n0006 GTE\n0007 CONST 2\n"
    );
}

#[test]
fn closure_keeps_block_scope_alive() {
    let program = Program::new(vec![Statement::Block(Block::new(vec![
        Statement::Let {
            name: "secret".to_string(),
            value: Expression::Integer(7),
        },
        Statement::Expression(Expression::Function {
            parameters: vec![],
            body: Block::new(vec![Statement::Expression(Expression::ident("secret"))]),
        }),
    ]))]);

    let bytecode = Compiler::new().compile_program(&program).unwrap();

    // The block has been left and the compiler dropped; the closure still
    // reaches the binding.
    match &bytecode.constants[0] {
        Object::Function(func) => assert_eq!(func.scope.get("secret"), Some(Object::Integer(7))),
        other => panic!("expected Function, got {:?}", other),
    }
}
