use std::collections::BTreeMap;
use std::hash::Hasher;
use std::rc::Rc;

use rustc_hash::FxHasher;

use super::node::Block;
use super::scope::Scope;

/// Native function signature for builtins.
pub type BuiltinFn = fn(&[Object]) -> Object;

/// Type tag carried by every runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectType {
    Null,
    Error,
    Integer,
    Boolean,
    String,
    Function,
    Builtin,
    Array,
    Hash,
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ObjectType::Null => "NULL",
            ObjectType::Error => "ERROR",
            ObjectType::Integer => "INTEGER",
            ObjectType::Boolean => "BOOLEAN",
            ObjectType::String => "STRING",
            ObjectType::Function => "FUNCTION",
            ObjectType::Builtin => "BUILTIN",
            ObjectType::Array => "ARRAY",
            ObjectType::Hash => "HASH",
        };
        write!(f, "{}", name)
    }
}

/// Content-derived key placing a hashable value into a [`HashObject`].
///
/// The type tag is part of the key, so `1` and `true` never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HashKey {
    pub object_type: ObjectType,
    pub value: u64,
}

/// Runtime value.
///
/// Error values travel through the same channel as every other value; they
/// are matched by variant rather than raised.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// 64-bit signed integer.
    Integer(i64),

    Boolean(bool),

    /// Owned UTF-8 text.
    String(String),

    Null,

    /// Error message carried as a value.
    Error(String),

    /// Closure: parameters, body, and the scope active at creation.
    Function(Function),

    Builtin(Builtin),

    Array(Vec<Object>),

    Hash(HashObject),
}

impl Object {
    pub fn error(message: impl Into<String>) -> Self {
        Object::Error(message.into())
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Integer(_) => ObjectType::Integer,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::String(_) => ObjectType::String,
            Object::Null => ObjectType::Null,
            Object::Error(_) => ObjectType::Error,
            Object::Function(_) => ObjectType::Function,
            Object::Builtin(_) => ObjectType::Builtin,
            Object::Array(_) => ObjectType::Array,
            Object::Hash(_) => ObjectType::Hash,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    /// `null` and `false` are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Object::Null => false,
            Object::Boolean(b) => *b,
            _ => true,
        }
    }

    /// Human-readable rendering of the value.
    pub fn inspect(&self) -> String {
        self.to_string()
    }

    /// Derive the key used to store this value in a hash.
    ///
    /// Only integers, booleans, and strings are hashable. Anything else
    /// yields an `Error` object describing the offending type.
    pub fn hash_key(&self) -> Result<HashKey, Object> {
        let value = match self {
            Object::Integer(n) => *n as u64,
            Object::Boolean(b) => u64::from(*b),
            Object::String(s) => {
                let mut hasher = FxHasher::default();
                hasher.write(s.as_bytes());
                hasher.finish()
            }
            other => {
                return Err(Object::error(format!(
                    "unusable as hash key: {}",
                    other.object_type()
                )));
            }
        };

        Ok(HashKey {
            object_type: self.object_type(),
            value,
        })
    }

    /// Build a hash value from key/value pairs.
    ///
    /// Returns the `Error` object for the first unhashable key instead.
    pub fn hash_from_pairs(pairs: impl IntoIterator<Item = (Object, Object)>) -> Object {
        let mut hash = HashObject::new();
        for (key, value) in pairs {
            if let Err(error) = hash.insert(key, value) {
                return error;
            }
        }
        Object::Hash(hash)
    }
}

impl std::fmt::Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::Integer(n) => write!(f, "{}", n),
            Object::Boolean(b) => write!(f, "{}", b),
            Object::String(s) => write!(f, "{}", s),
            Object::Null => write!(f, "null"),
            Object::Error(message) => write!(f, "ERROR: {}", message),
            Object::Function(func) => write!(f, "{}", func),
            Object::Builtin(_) => write!(f, "builtin function"),
            Object::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Object::Hash(hash) => {
                write!(f, "{{")?;
                for (i, pair) in hash.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", pair.key, pair.value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// User-defined function value.
#[derive(Clone)]
pub struct Function {
    pub parameters: Vec<String>,
    pub body: Rc<Block>,
    /// Scope the function closes over. Kept alive for as long as the
    /// function value is.
    pub scope: Rc<Scope>,
}

impl Function {
    pub fn new(parameters: Vec<String>, body: Rc<Block>, scope: Rc<Scope>) -> Self {
        Self {
            parameters,
            body,
            scope,
        }
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.parameters == other.parameters
            && Rc::ptr_eq(&self.body, &other.body)
            && Rc::ptr_eq(&self.scope, &other.scope)
    }
}

// The captured scope can hold this very function, so Debug must not walk it.
impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("statements", &self.body.statements.len())
            .field("scope_depth", &self.scope.depth())
            .finish()
    }
}

impl std::fmt::Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "fn({}) {{ <{} statements> }}",
            self.parameters.join(", "),
            self.body.statements.len()
        )
    }
}

/// Native function exposed to programs.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl Builtin {
    pub fn new(name: &'static str, func: BuiltinFn) -> Self {
        Self { name, func }
    }

    pub fn call(&self, args: &[Object]) -> Object {
        (self.func)(args)
    }
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::fn_addr_eq(self.func, other.func)
    }
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

/// Original key alongside its value, so the key can be rendered back.
#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

/// Hash value, ordered by [`HashKey`] so rendering is deterministic.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HashObject {
    pairs: BTreeMap<HashKey, HashPair>,
}

impl HashObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair, replacing any value stored under an equal key.
    pub fn insert(&mut self, key: Object, value: Object) -> Result<(), Object> {
        let hash_key = key.hash_key()?;
        self.pairs.insert(hash_key, HashPair { key, value });
        Ok(())
    }

    pub fn get(&self, key: &Object) -> Result<Option<&Object>, Object> {
        let hash_key = key.hash_key()?;
        Ok(self.pairs.get(&hash_key).map(|pair| &pair.value))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HashPair> {
        self.pairs.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(args: &[Object]) -> Object {
        args.first().cloned().unwrap_or(Object::Null)
    }

    #[test]
    fn test_integer_hash_keys_match() {
        let a = Object::Integer(42).hash_key().unwrap();
        let b = Object::Integer(42).hash_key().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Object::Integer(43).hash_key().unwrap());
    }

    #[test]
    fn test_string_hash_keys_match() {
        let a = Object::String("hello".to_string()).hash_key().unwrap();
        let b = Object::String("hello".to_string()).hash_key().unwrap();
        let c = Object::String("world".to_string()).hash_key().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_integer_and_boolean_keys_never_collide() {
        let int_key = Object::Integer(1).hash_key().unwrap();
        let bool_key = Object::Boolean(true).hash_key().unwrap();

        assert_eq!(int_key.value, bool_key.value);
        assert_ne!(int_key, bool_key);
    }

    #[test]
    fn test_boolean_hash_values() {
        assert_eq!(Object::Boolean(false).hash_key().unwrap().value, 0);
        assert_eq!(Object::Boolean(true).hash_key().unwrap().value, 1);
    }

    #[test]
    fn test_unhashable_key_is_error_object() {
        let err = Object::Array(vec![]).hash_key().unwrap_err();
        assert_eq!(err, Object::error("unusable as hash key: ARRAY"));
        assert!(err.is_error());
    }

    #[test]
    fn test_hash_from_pairs_reports_unhashable_key() {
        let result = Object::hash_from_pairs(vec![
            (Object::Integer(1), Object::Integer(2)),
            (Object::Null, Object::Integer(3)),
        ]);
        assert_eq!(result, Object::error("unusable as hash key: NULL"));
    }

    #[test]
    fn test_hash_insert_and_get() {
        let mut hash = HashObject::new();
        hash.insert(Object::String("a".to_string()), Object::Integer(1))
            .unwrap();
        hash.insert(Object::Integer(1), Object::Integer(2)).unwrap();
        hash.insert(Object::String("a".to_string()), Object::Integer(3))
            .unwrap();

        assert_eq!(hash.len(), 2);
        assert_eq!(
            hash.get(&Object::String("a".to_string())).unwrap(),
            Some(&Object::Integer(3))
        );
        assert_eq!(hash.get(&Object::Boolean(true)).unwrap(), None);
        assert!(hash.get(&Object::Array(vec![])).is_err());
    }

    #[test]
    fn test_inspect() {
        assert_eq!(Object::Integer(-7).inspect(), "-7");
        assert_eq!(Object::Boolean(true).inspect(), "true");
        assert_eq!(Object::String("hi".to_string()).inspect(), "hi");
        assert_eq!(Object::Null.inspect(), "null");
        assert_eq!(Object::error("boom").inspect(), "ERROR: boom");
        assert_eq!(
            Object::Array(vec![Object::Integer(1), Object::Null]).inspect(),
            "[1, null]"
        );
        assert_eq!(
            Object::Builtin(Builtin::new("first", first)).inspect(),
            "builtin function"
        );
    }

    #[test]
    fn test_hash_inspect_is_ordered_by_key() {
        let hash = Object::hash_from_pairs(vec![
            (Object::Boolean(true), Object::Integer(2)),
            (Object::Integer(5), Object::Integer(1)),
        ]);
        assert_eq!(hash.inspect(), "{5: 1, true: 2}");
    }

    #[test]
    fn test_function_captures_scope() {
        let scope = Scope::root();
        scope.set("x", Object::Integer(10));

        let func = Function::new(
            vec!["a".to_string(), "b".to_string()],
            Rc::new(Block::default()),
            Rc::clone(&scope),
        );
        drop(scope);

        assert_eq!(func.scope.get("x"), Some(Object::Integer(10)));
        assert_eq!(
            Object::Function(func).inspect(),
            "fn(a, b) { <0 statements> }"
        );
    }

    #[test]
    fn test_builtin_call() {
        let builtin = Builtin::new("first", first);
        assert_eq!(builtin.call(&[Object::Integer(9)]), Object::Integer(9));
        assert_eq!(builtin.call(&[]), Object::Null);
    }

    #[test]
    fn test_builtin_equality_is_by_function() {
        fn len(args: &[Object]) -> Object {
            Object::Integer(args.len() as i64)
        }

        assert_eq!(Builtin::new("first", first), Builtin::new("head", first));
        assert_ne!(Builtin::new("first", first), Builtin::new("first", len));
    }

    #[test]
    fn test_truthiness() {
        assert!(!Object::Null.is_truthy());
        assert!(!Object::Boolean(false).is_truthy());
        assert!(Object::Integer(0).is_truthy());
    }
}
