use crate::java_source::ast::{FieldDeclaration, TypeDeclaration, TypeRef, TypeScope};
use crate::java_source::Annotation;

use super::naming::camel_to_snake;

const RELATIONSHIP_ANNOTATIONS: &[&str] = &["ManyToOne", "OneToOne", "OneToMany", "ManyToMany"];

/// Wrappers whose type argument is the related entity.
const COLLECTION_TYPES: &[&str] = &[
    "List",
    "Set",
    "SortedSet",
    "Collection",
    "Iterable",
    "Optional",
];

/// Table and field metadata mined from one `@Entity` class.
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    /// Fully qualified type name.
    pub type_name: String,
    /// `@Table` name, exactly as declared (JPA quoted identifiers keep their quotes).
    pub table_name: Option<String>,
    /// First field carrying `@Id`.
    pub primary_key_field: Option<String>,
    declaration: TypeDeclaration,
    scope: TypeScope,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    pub column_name: String,
    pub join_target: Option<JoinTarget>,
}

/// Relationship metadata of a field, before the target type is located.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinTarget {
    /// Element type for collection-valued fields.
    pub target_type: TypeRef,
    pub local_column: Option<String>,
    pub referenced_column: Option<String>,
    /// `mappedBy` of an inverse relationship.
    pub mapped_by: Option<String>,
}

impl EntityDescriptor {
    pub fn new(type_name: impl Into<String>, declaration: TypeDeclaration, scope: TypeScope) -> Self {
        let table_name = declaration.annotation("Table").and_then(table_name);
        let primary_key_field = declaration
            .fields
            .iter()
            .find(|f| f.has_annotation("Id") || f.has_annotation("EmbeddedId"))
            .and_then(|f| f.names.first().cloned());

        EntityDescriptor {
            type_name: type_name.into(),
            table_name,
            primary_key_field,
            declaration,
            scope,
        }
    }

    pub fn simple_name(&self) -> &str {
        &self.declaration.name
    }

    pub fn scope(&self) -> &TypeScope {
        &self.scope
    }

    pub fn primary_key_column(&self) -> Option<String> {
        self.primary_key_field.as_deref().map(camel_to_snake)
    }

    /// Column metadata for `field`, derived on demand.
    pub fn column(&self, field: &str) -> Option<ColumnDescriptor> {
        let decl = self.declaration.field(field)?;
        let join_column = decl.annotation("JoinColumn");

        let join_target = (join_column.is_some() || is_relationship(decl)).then(|| JoinTarget {
            target_type: element_type(&decl.type_ref).clone(),
            local_column: join_column
                .and_then(|a| a.member("name").or_else(|| a.member("value")))
                .map(|v| camel_to_snake(v.text())),
            referenced_column: join_column
                .and_then(|a| a.member("referencedColumnName"))
                .map(|v| camel_to_snake(v.text())),
            mapped_by: RELATIONSHIP_ANNOTATIONS
                .iter()
                .filter_map(|name| decl.annotation(name))
                .find_map(|a| a.member("mappedBy"))
                .map(|v| v.text().to_string()),
        });

        let column_name = join_target
            .as_ref()
            .and_then(|t| t.local_column.clone())
            .unwrap_or_else(|| camel_to_snake(field));

        Some(ColumnDescriptor {
            column_name,
            join_target,
        })
    }

    /// Declared type of `field`, unwrapped to the element type for collections.
    pub fn field_element_type(&self, field: &str) -> Option<&TypeRef> {
        self.declaration
            .field(field)
            .map(|decl| element_type(&decl.type_ref))
    }
}

fn table_name(table: &Annotation) -> Option<String> {
    let value = if table.is_single() {
        table.member("value")
    } else {
        table.member("name")
    };
    value.map(|v| v.text().to_string())
}

fn is_relationship(field: &FieldDeclaration) -> bool {
    RELATIONSHIP_ANNOTATIONS
        .iter()
        .any(|name| field.has_annotation(name))
}

pub fn element_type(type_ref: &TypeRef) -> &TypeRef {
    match type_ref.args.as_slice() {
        [element] if COLLECTION_TYPES.contains(&type_ref.simple_name()) => element,
        [_, value] if type_ref.simple_name() == "Map" => value,
        _ => type_ref,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::java_source::parse_compilation_unit;

    fn descriptor(src: &str) -> EntityDescriptor {
        let unit = parse_compilation_unit(src).unwrap();
        let scope = unit.scope();
        let decl = unit.types.into_iter().next().unwrap();
        EntityDescriptor::new(format!("com.acme.{}", decl.name), decl, scope)
    }

    #[test]
    fn test_named_table_and_primary_key() {
        let entity = descriptor(
            r#"@Entity @Table(name = "discharge_detail") public class DischargeDetail {
                @Id private Long detailId;
                private Long hospitalId;
            }"#,
        );
        assert_eq!(entity.table_name.as_deref(), Some("discharge_detail"));
        assert_eq!(entity.primary_key_column().as_deref(), Some("detail_id"));
        assert_eq!(entity.simple_name(), "DischargeDetail");
    }

    #[test]
    fn test_single_value_table_and_missing_table() {
        let entity = descriptor(r#"@Table("ward") class Ward { }"#);
        assert_eq!(entity.table_name.as_deref(), Some("ward"));

        let entity = descriptor("@Entity class Bed { }");
        assert_eq!(entity.table_name, None);
        assert_eq!(entity.primary_key_field, None);
    }

    #[test]
    fn test_columns() {
        let entity = descriptor(
            r#"class DischargeDetail {
                private Long patientId;
                @ManyToOne
                @JoinColumn(name = "nurse_request_id", referencedColumnName = "id")
                private NurseRequest dischargeNurseRequest;
                @ManyToOne @JoinColumn("wardNo") private Ward ward;
                @OneToMany(mappedBy = "detail") private Set<DischargeNote> notes;
            }"#,
        );

        let plain = entity.column("patientId").unwrap();
        assert_eq!(plain.column_name, "patient_id");
        assert!(plain.join_target.is_none());

        let request = entity.column("dischargeNurseRequest").unwrap();
        assert_eq!(request.column_name, "nurse_request_id");
        let target = request.join_target.unwrap();
        assert_eq!(target.target_type.name, "NurseRequest");
        assert_eq!(target.referenced_column.as_deref(), Some("id"));

        let ward = entity.column("ward").unwrap().join_target.unwrap();
        assert_eq!(ward.local_column.as_deref(), Some("ward_no"));
        assert_eq!(ward.referenced_column, None);

        let notes = entity.column("notes").unwrap().join_target.unwrap();
        assert_eq!(notes.target_type.name, "DischargeNote");
        assert_eq!(notes.mapped_by.as_deref(), Some("detail"));

        assert!(entity.column("missing").is_none());
    }
}
