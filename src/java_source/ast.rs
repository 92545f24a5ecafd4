use std::fmt;

/// The declarations of one Java source file, as far as query sampling needs them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompilationUnit {
    pub package: Option<String>,
    pub imports: Vec<Import>,
    pub types: Vec<TypeDeclaration>,
}

impl CompilationUnit {
    /// The first top-level type, which by convention is the public one.
    pub fn primary_type(&self) -> Option<&TypeDeclaration> {
        self.types.first()
    }

    pub fn scope(&self) -> TypeScope {
        TypeScope {
            package: self.package.clone(),
            imports: self.imports.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub path: String,
    pub is_static: bool,
    pub is_wildcard: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDeclaration {
    pub kind: TypeKind,
    pub name: String,
    pub annotations: Vec<Annotation>,
    pub extends: Vec<TypeRef>,
    pub implements: Vec<TypeRef>,
    pub fields: Vec<FieldDeclaration>,
    pub methods: Vec<MethodDeclaration>,
}

impl TypeDeclaration {
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        find_annotation(&self.annotations, name)
    }

    /// Looks up a field by variable name; multi-declarators (`int a, b;`) match any of their names.
    pub fn field(&self, name: &str) -> Option<&FieldDeclaration> {
        self.fields.iter().find(|f| f.names.iter().any(|n| n == name))
    }
}

/// A (possibly generic, possibly qualified) type as written in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub name: String,
    pub args: Vec<TypeRef>,
    pub array_dims: usize,
}

impl TypeRef {
    pub fn simple(name: impl Into<String>) -> Self {
        TypeRef {
            name: name.into(),
            args: Vec::new(),
            array_dims: 0,
        }
    }

    /// Last segment of the name: `java.util.List` -> `List`.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn is_qualified(&self) -> bool {
        self.name.contains('.')
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(|a| a.to_string()).collect();
            write!(f, "<{}>", args.join(", "))?;
        }
        for _ in 0..self.array_dims {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Simple name, without any package qualifier.
    pub name: String,
    pub value: AnnotationValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    /// `@Id`
    Marker,
    /// `@Table("detail")`
    Single(ElementValue),
    /// `@Table(name = "detail", schema = "ehr")`
    Named(Vec<(String, ElementValue)>),
}

impl Annotation {
    /// The value of member `name`. The single-member form answers to `value`.
    pub fn member(&self, name: &str) -> Option<&ElementValue> {
        match &self.value {
            AnnotationValue::Marker => None,
            AnnotationValue::Single(v) => (name == "value").then_some(v),
            AnnotationValue::Named(pairs) => pairs.iter().find(|(n, _)| n == name).map(|(_, v)| v),
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self.value, AnnotationValue::Single(_))
    }
}

/// An annotation member value. `raw` is the source text; `constant` holds the
/// evaluated string when the value is a literal or a `+` chain of literals.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementValue {
    pub raw: String,
    pub constant: Option<String>,
}

impl ElementValue {
    /// The string constant if there is one, otherwise the raw source text.
    pub fn text(&self) -> &str {
        self.constant.as_deref().unwrap_or(&self.raw)
    }

    pub fn is_true(&self) -> bool {
        self.raw.trim() == "true"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDeclaration {
    pub annotations: Vec<Annotation>,
    pub type_ref: TypeRef,
    pub names: Vec<String>,
}

impl FieldDeclaration {
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        find_annotation(&self.annotations, name)
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotation(name).is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDeclaration {
    pub annotations: Vec<Annotation>,
    pub name: String,
    pub return_type: Option<TypeRef>,
}

impl MethodDeclaration {
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        find_annotation(&self.annotations, name)
    }
}

fn find_annotation<'a>(annotations: &'a [Annotation], name: &str) -> Option<&'a Annotation> {
    annotations.iter().find(|a| a.name == name)
}

/// Package and imports of a unit: enough to turn a simple type name into
/// fully qualified candidates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeScope {
    pub package: Option<String>,
    pub imports: Vec<Import>,
}

impl TypeScope {
    /// Fully qualified names `type_name` may refer to, most specific first:
    /// an explicit import, the unit's own package, then wildcard imports.
    pub fn candidates(&self, type_name: &str) -> Vec<String> {
        if type_name.contains('.') {
            return vec![type_name.to_string()];
        }

        let mut candidates = Vec::new();
        for import in self.imports.iter().filter(|i| !i.is_static && !i.is_wildcard) {
            if import.path.rsplit('.').next() == Some(type_name) {
                candidates.push(import.path.clone());
            }
        }
        match &self.package {
            Some(package) => candidates.push(format!("{}.{}", package, type_name)),
            None => candidates.push(type_name.to_string()),
        }
        for import in self.imports.iter().filter(|i| !i.is_static && i.is_wildcard) {
            candidates.push(format!("{}.{}", import.path, type_name));
        }
        candidates
    }
}
