//! Navigation trail for a folder path.

use userdrive_core::types::Breadcrumb;

/// Breadcrumbs from the root down to `relative`.
///
/// The first crumb is always the root (`name` and `path` both empty);
/// each following crumb carries one segment and its cumulative path.
pub fn breadcrumbs(relative: &str) -> Vec<Breadcrumb> {
    let mut trail = vec![Breadcrumb {
        name: String::new(),
        path: String::new(),
    }];

    let mut path = String::new();
    for segment in relative.split('/').filter(|s| !s.is_empty()) {
        if !path.is_empty() {
            path.push('/');
        }
        path.push_str(segment);
        trail.push(Breadcrumb {
            name: segment.to_string(),
            path: path.clone(),
        });
    }
    trail
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_only() {
        let trail = breadcrumbs("");
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].path, "");
    }

    #[test]
    fn test_cumulative_paths() {
        let paths: Vec<_> = breadcrumbs("docs/2024/q1")
            .into_iter()
            .map(|c| (c.name, c.path))
            .collect();
        assert_eq!(
            paths,
            vec![
                (String::new(), String::new()),
                ("docs".to_string(), "docs".to_string()),
                ("2024".to_string(), "docs/2024".to_string()),
                ("q1".to_string(), "docs/2024/q1".to_string()),
            ]
        );
    }
}
