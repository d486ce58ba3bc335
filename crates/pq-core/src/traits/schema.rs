use crate::schema::FieldDescriptor;

/// Trait for schema introspection
///
/// This trait provides methods for examining and querying schemas
/// without modifying them.
pub trait SchemaInspector {
    /// Get the total number of fields (including nested, excluding the root)
    fn field_count(&self) -> usize;

    /// Get field by path (e.g., "address.city")
    fn get_field_by_path(&self, path: &str) -> Option<&FieldDescriptor>;

    /// Check if schema contains a specific field
    fn has_field(&self, path: &str) -> bool {
        self.get_field_by_path(path).is_some()
    }

    /// Get all field paths in the schema, parents before their children
    fn all_field_paths(&self) -> Vec<String>;
}

impl SchemaInspector for crate::Schema {
    fn field_count(&self) -> usize {
        self.fields().iter().map(count_fields).sum()
    }

    fn get_field_by_path(&self, path: &str) -> Option<&FieldDescriptor> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut node = self.fields().iter().find(|f| f.name == first)?;
        for part in parts {
            node = node.children.iter().find(|f| f.name == part)?;
        }
        Some(node)
    }

    fn all_field_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for field in self.fields() {
            collect_field_paths(field, "", &mut paths);
        }
        paths
    }
}

fn count_fields(field: &FieldDescriptor) -> usize {
    1 + field.children.iter().map(count_fields).sum::<usize>()
}

fn collect_field_paths(field: &FieldDescriptor, prefix: &str, paths: &mut Vec<String>) {
    let current_path = if prefix.is_empty() {
        field.name.clone()
    } else {
        format!("{}.{}", prefix, field.name)
    };

    paths.push(current_path.clone());
    for child in &field.children {
        collect_field_paths(child, &current_path, paths);
    }
}
