use arrow_schema::SchemaRef;
use parquet::basic::{ConvertedType, LogicalType, Repetition as ParquetRepetition, Type as PhysicalType};
use parquet::schema::types::{SchemaDescriptor, Type};
use std::fmt::Write;

/// Schema of a Parquet file as declared in its footer.
///
/// Carries both the Parquet field tree (for display) and the Arrow schema the
/// reader decodes into and the split writer encodes from.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    root_name: String,
    fields: Vec<FieldDescriptor>,
    arrow: SchemaRef,
}

/// One field of the file schema; groups carry their children
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    /// `None` for group fields
    pub physical_type: Option<PhysicalType>,
    pub logical_type: Option<LogicalType>,
    pub converted_type: Option<ConvertedType>,
    pub repetition: Repetition,
    pub type_length: Option<i32>,
    pub precision: Option<i32>,
    pub scale: Option<i32>,
    pub children: Vec<FieldDescriptor>,
}

/// Represents how values are repeated in Parquet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repetition {
    /// Field must have exactly one value
    Required,
    /// Field can have 0 or 1 value
    Optional,
    /// Field can have 0 or more values
    Repeated,
}

impl From<ParquetRepetition> for Repetition {
    fn from(repetition: ParquetRepetition) -> Self {
        match repetition {
            ParquetRepetition::REQUIRED => Repetition::Required,
            ParquetRepetition::OPTIONAL => Repetition::Optional,
            ParquetRepetition::REPEATED => Repetition::Repeated,
        }
    }
}

impl Repetition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Repetition::Required => "required",
            Repetition::Optional => "optional",
            Repetition::Repeated => "repeated",
        }
    }
}

impl Schema {
    /// Build from the footer's schema descriptor and the matching Arrow schema
    pub fn from_parquet(descr: &SchemaDescriptor, arrow: SchemaRef) -> Self {
        let root = descr.root_schema();
        let fields = match root {
            Type::GroupType { fields, .. } => fields.iter().map(|f| field_from_type(f)).collect(),
            Type::PrimitiveType { .. } => vec![field_from_type(root)],
        };
        Self {
            root_name: root.name().to_string(),
            fields,
            arrow,
        }
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// Top-level fields in declaration order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn arrow_schema(&self) -> &SchemaRef {
        &self.arrow
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FieldDescriptor {
    pub fn is_group(&self) -> bool {
        self.physical_type.is_none()
    }

    /// Physical type name, or `group` for nested fields
    pub fn type_label(&self) -> String {
        match self.physical_type {
            Some(PhysicalType::FIXED_LEN_BYTE_ARRAY) => match self.type_length {
                Some(len) => format!("FIXED_LEN_BYTE_ARRAY({})", len),
                None => "FIXED_LEN_BYTE_ARRAY".to_string(),
            },
            Some(physical) => physical.to_string(),
            None => "group".to_string(),
        }
    }
}

fn field_from_type(ty: &Type) -> FieldDescriptor {
    let info = ty.get_basic_info();
    let repetition = if info.has_repetition() {
        info.repetition().into()
    } else {
        Repetition::Required
    };
    let converted_type = match info.converted_type() {
        ConvertedType::NONE => None,
        converted => Some(converted),
    };

    let mut field = FieldDescriptor {
        name: info.name().to_string(),
        physical_type: None,
        logical_type: info.logical_type(),
        converted_type,
        repetition,
        type_length: None,
        precision: None,
        scale: None,
        children: Vec::new(),
    };

    match ty {
        Type::PrimitiveType {
            physical_type,
            type_length,
            scale,
            precision,
            ..
        } => {
            field.physical_type = Some(*physical_type);
            field.type_length = (*type_length > 0).then_some(*type_length);
            if *precision > 0 {
                field.precision = Some(*precision);
                field.scale = Some((*scale).max(0));
            }
        }
        Type::GroupType { fields, .. } => {
            field.children = fields.iter().map(|f| field_from_type(f)).collect();
        }
    }

    field
}

fn unit_name(unit: &impl std::fmt::Debug) -> String {
    let debug = format!("{:?}", unit);
    debug
        .split('(')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Human readable name of a logical type annotation
pub fn logical_type_name(logical: &LogicalType) -> String {
    match logical {
        LogicalType::String => "String".to_string(),
        LogicalType::Map => "Map".to_string(),
        LogicalType::List => "List".to_string(),
        LogicalType::Enum => "Enum".to_string(),
        LogicalType::Date => "Date".to_string(),
        LogicalType::Json => "Json".to_string(),
        LogicalType::Bson => "Bson".to_string(),
        LogicalType::Uuid => "Uuid".to_string(),
        LogicalType::Decimal { scale, precision } => format!("Decimal({}, {})", precision, scale),
        LogicalType::Integer {
            bit_width,
            is_signed,
        } => format!("Integer({}, {})", bit_width, if *is_signed { "signed" } else { "unsigned" }),
        LogicalType::Time {
            is_adjusted_to_u_t_c,
            unit,
        } => format!("Time({}, utc={})", unit_name(unit), is_adjusted_to_u_t_c),
        LogicalType::Timestamp {
            is_adjusted_to_u_t_c,
            unit,
        } => format!("Timestamp({}, utc={})", unit_name(unit), is_adjusted_to_u_t_c),
        other => format!("{:?}", other),
    }
}

/// Render the schema and row count for display.
///
/// One line per field in declaration order; nested fields are indented under
/// their group.
pub fn describe(schema: &Schema, row_count: u64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "File contains {} rows of data", row_count);
    let _ = writeln!(out, "Schema elements (fields):");
    for field in schema.fields() {
        write_field(&mut out, field, 1);
    }
    out
}

/// One field and its children in the layout used by [`describe`]
pub fn describe_field(field: &FieldDescriptor) -> String {
    let mut out = String::new();
    write_field(&mut out, field, 1);
    out
}

fn write_field(out: &mut String, field: &FieldDescriptor, depth: usize) {
    let _ = write!(out, "{}{}: {}", "  ".repeat(depth), field.name, field.type_label());
    if let Some(logical) = &field.logical_type {
        let _ = write!(out, ", logical={}", logical_type_name(logical));
    }
    if let Some(converted) = &field.converted_type {
        let _ = write!(out, ", converted={}", converted);
    }
    let _ = writeln!(out, ", {}", field.repetition.as_str());

    for child in &field.children {
        write_field(out, child, depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_schema::Schema as ArrowSchema;
    use parquet::schema::parser::parse_message_type;
    use std::sync::Arc;

    fn schema_from(message: &str) -> Schema {
        let root = parse_message_type(message).unwrap();
        let descr = SchemaDescriptor::new(Arc::new(root));
        Schema::from_parquet(&descr, Arc::new(ArrowSchema::empty()))
    }

    #[test]
    fn test_fields_in_declaration_order() {
        let schema = schema_from(
            "message spark_schema {
                required int64 id;
                optional binary Name (UTF8);
                optional group address {
                    optional binary city (UTF8);
                }
                repeated int32 scores;
            }",
        );

        assert_eq!(schema.root_name(), "spark_schema");
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "Name", "address", "scores"]);

        let address = &schema.fields()[2];
        assert!(address.is_group());
        assert_eq!(address.children[0].name, "city");
        assert_eq!(schema.fields()[3].repetition, Repetition::Repeated);
    }

    #[test]
    fn test_decimal_and_fixed_len_details() {
        let schema = schema_from(
            "message m {
                required fixed_len_byte_array(16) price (DECIMAL(30, 4));
            }",
        );
        let price = &schema.fields()[0];
        assert_eq!(price.type_length, Some(16));
        assert_eq!(price.precision, Some(30));
        assert_eq!(price.scale, Some(4));
        assert_eq!(price.type_label(), "FIXED_LEN_BYTE_ARRAY(16)");
    }

    #[test]
    fn test_describe_output() {
        let schema = schema_from(
            "message m {
                required int64 id;
                optional binary name (UTF8);
                optional group address {
                    required int32 zip;
                }
            }",
        );
        let text = describe(&schema, 100);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "File contains 100 rows of data");
        assert_eq!(lines[1], "Schema elements (fields):");
        assert_eq!(lines[2], "  id: INT64, required");
        assert_eq!(lines[3], "  name: BYTE_ARRAY, logical=String, converted=UTF8, optional");
        assert_eq!(lines[4], "  address: group, optional");
        assert_eq!(lines[5], "    zip: INT32, required");
    }

    #[test]
    fn test_describe_single_field() {
        let schema = schema_from(
            "message m {
                optional group address {
                    required int32 zip;
                }
            }",
        );
        assert_eq!(
            describe_field(&schema.fields()[0]),
            "  address: group, optional\n    zip: INT32, required\n"
        );
    }

    #[test]
    fn test_logical_type_names() {
        assert_eq!(
            logical_type_name(&LogicalType::Decimal {
                scale: 2,
                precision: 10
            }),
            "Decimal(10, 2)"
        );
        assert_eq!(
            logical_type_name(&LogicalType::Integer {
                bit_width: 8,
                is_signed: false
            }),
            "Integer(8, unsigned)"
        );
    }
}
