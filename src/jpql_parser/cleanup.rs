use regex::Regex;
use std::sync::LazyLock;

// `select new com.acme.dto.Summary(d.id, d.name) from ...`
static CONSTRUCTOR_PROJECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\bnew\s+.*?\s+from\s+").unwrap());

// `"... " + "..."` left over when an annotation value is not a plain constant
static CONCATENATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""\s*\+\s*""#).unwrap());

/// Normalizes annotation query text before parsing: constructor projections
/// become `*` and Java string concatenation residue is removed.
pub fn clean_up(query: &str) -> String {
    let query = CONCATENATION.replace_all(query, " ");
    let query = CONSTRUCTOR_PROJECTION.replace_all(&query, " * from ");
    query.replace('"', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_projection() {
        assert_eq!(
            clean_up("select new com.acme.Summary(d.id, d.name)\n FROM Detail d"),
            "select  * from Detail d"
        );
    }

    #[test]
    fn test_concatenation_residue() {
        assert_eq!(
            clean_up(r#""select d from Detail d " + "where d.id = ?1""#),
            "select d from Detail d  where d.id = ?1"
        );
    }

    #[test]
    fn test_constructor_split_across_literals() {
        assert_eq!(
            clean_up(r#""select new com.acme.Summary(d.id) " + "from Detail d""#),
            "select  * from Detail d"
        );
    }

    #[test]
    fn test_renew_is_not_a_constructor() {
        let query = "select d.renewDate from Detail d";
        assert_eq!(clean_up(query), query);
    }
}
