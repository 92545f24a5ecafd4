use crate::java_source::TypeDeclaration;

/// A query declared with `@Query` on a repository method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQuery {
    pub method: String,
    pub text: String,
    pub is_native: bool,
}

/// `@Query` declarations of `repository` in source order. Methods without
/// one are derived queries and are skipped.
pub fn declared_queries(repository: &TypeDeclaration) -> Vec<SourceQuery> {
    repository
        .methods
        .iter()
        .filter_map(|method| {
            let annotation = method.annotation("Query")?;
            let text = annotation.member("value")?.text().to_string();
            let is_native = !annotation.is_single()
                && annotation
                    .member("nativeQuery")
                    .is_some_and(|value| value.is_true());
            Some(SourceQuery {
                method: method.name.clone(),
                text,
                is_native,
            })
        })
        .collect()
}
