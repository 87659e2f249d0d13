//! The canonical employee record and the production input/operation sets.
//!
//! Field names are the record's external serialization names; the mapping
//! rules address them as dotted paths after flattening.

use std::collections::HashSet;

use crate::meta::{Field, Schema};

fn dependent() -> Schema {
    Schema::Struct(vec![
        Field::new("first_name", Schema::String),
        Field::new("last_name", Schema::String),
        Field::new("date_of_birth", Schema::Date),
        Field::new("sex", Schema::String),
        Field::new("relationship", Schema::String),
        Field::new("relationship_effective_date", Schema::Date),
        Field::new("student", Schema::Bool),
        Field::new("over_age_disabled", Schema::Bool),
        Field::new("tobacco_user", Schema::Bool),
        Field::new("dependent_id", Schema::String),
    ])
}

fn benefit() -> Schema {
    Schema::Struct(vec![
        Field::new("benefit_type", Schema::String),
        Field::new("status", Schema::String),
        Field::new("effective_date", Schema::Date),
    ])
}

/// The canonical employee record schema.
pub fn employee_schema() -> Schema {
    Schema::Struct(vec![
        // User profile fields
        Field::new("employee_id", Schema::String),
        Field::new("first_name", Schema::String),
        Field::new("last_name", Schema::String),
        Field::new("email", Schema::String),
        Field::new("preferred_first_name", Schema::String),
        Field::new("sex", Schema::String),
        Field::new("date_of_birth", Schema::Date),
        Field::new("phone_number", Schema::String),
        Field::new("locale", Schema::String),
        Field::new("national_identification_number", Schema::String),
        Field::new("registered_indian_act", Schema::Bool),
        Field::new("tobacco_user", Schema::Bool),
        Field::new("address1", Schema::String),
        Field::new("address2", Schema::String),
        Field::new("city", Schema::String),
        Field::new("province", Schema::String),
        Field::new("country", Schema::String),
        Field::new("postal_code", Schema::String),
        // Group membership fields
        Field::new("group_id", Schema::String),
        Field::new("benefit_class", Schema::String),
        Field::new("date_of_hire", Schema::Date),
        Field::new("benefits_start_date", Schema::Date),
        Field::new("province_of_employment", Schema::String),
        Field::new("annual_earnings", Schema::Float),
        Field::new("annual_earnings_for_pooled_benefits", Schema::Float),
        Field::new("annual_earnings_effective_date", Schema::Date),
        Field::new("hrs_worked_per_week", Schema::Float),
        Field::new("title", Schema::String),
        Field::new("office_location", Schema::String),
        Field::new("employment_status", Schema::String),
        Field::new("occupation", Schema::String),
        Field::new("activation_date", Schema::Date),
        Field::new("suspension_type", Schema::String),
        Field::new("suspension_reason", Schema::String),
        Field::new("suspended_date", Schema::Date),
        Field::new("billing_division", Schema::String),
        Field::new("pay_group", Schema::String),
        Field::new("employee_leave", Schema::String),
        Field::new("employee_leave_start_date", Schema::Date),
        Field::new("enrollment_end_date", Schema::Date),
        Field::new("no_platform_fee_charges", Schema::Bool),
        Field::new("department", Schema::String),
        Field::new("custom_fields", Schema::Dynamic),
        Field::new("benefit_class_change_effective_date", Schema::Date),
        // Dependents and benefits
        Field::new("dependents", Schema::Seq(Box::new(dependent()))),
        Field::new("benefits", Schema::Seq(Box::new(benefit()))),
        // Control fields
        Field::new("state", Schema::String),
        Field::new("state_effective_date", Schema::Date),
        Field::new("fields_to_update", Schema::Seq(Box::new(Schema::String))),
        // Special rules
        Field::new("on_benefit_class_change", Schema::String),
        Field::new("on_reinstate", Schema::String),
    ])
}

/// The input fields provided by the payroll feed.
pub fn default_inputs() -> HashSet<String> {
    [
        "policy",
        "sin",
        "employee_id",
        "last_name",
        "given_names",
        "person_type",
        "effective_date",
        "transaction_date",
        "division",
        "benefit_class",
        "administrative_class",
        "retirement_date",
        "termination_date",
        "deceased_date",
        "birth_date",
        "gender",
        "language",
        "street",
        "city",
        "province_state",
        "postal_zip_code",
        "foreign_country",
        "hire_date",
        "province_of_employment",
        "province_of_residence",
        "employee_smoker",
        "business_location",
        "cost_centre",
        "tax_exempt",
        "does_employee_have_dependants",
        "spouse_or_common_law_spouse",
        "num_of_dependants",
        "bank_transit_id",
        "bank_number",
        "bank_account_number",
        "earnings_amount",
        "earnings_frequency",
        "dependant_name_on_drug_card",
        "revision_reason",
        "created_by",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

/// The built-in operations available inside a call.
pub fn default_operations() -> HashSet<String> {
    [
        "strip_prefix",
        "strip_leading_zeros",
        "first_of",
        "map",
        "select",
        "all",
        "any",
        "one_of",
        "join",
        "+",
        "*",
        "=",
        "!=",
        "<",
        ">",
        "<=",
        ">=",
        "min",
        "max",
        "has",
        "first_of_month",
        "weekly_hours",
        "config",
        "fail",
        "log",
        "ticket",
        "contains",
        "skip",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{Kind, Meta};

    #[test]
    fn test_profile_fields_flatten() {
        let meta = Meta::from_schema(&employee_schema());
        assert_eq!(meta.kind("employee_id"), Kind::String);
        assert_eq!(meta.kind("date_of_birth"), Kind::Date);
        assert_eq!(meta.kind("annual_earnings"), Kind::Float);
        assert_eq!(meta.kind("no_platform_fee_charges"), Kind::Bool);
    }

    #[test]
    fn test_dependent_paths_flatten_through_sequence() {
        let meta = Meta::from_schema(&employee_schema());
        assert_eq!(meta.kind("dependents"), Kind::Slice);
        assert_eq!(meta.kind("dependents.+.first_name"), Kind::String);
        assert_eq!(meta.kind("dependents.-.tobacco_user"), Kind::Bool);
        assert_eq!(meta.kind("benefits.+.effective_date"), Kind::Date);
    }

    #[test]
    fn test_custom_fields_is_open() {
        let meta = Meta::from_schema(&employee_schema());
        assert_eq!(meta.kind("custom_fields"), Kind::Map);
    }

    #[test]
    fn test_comparison_operations_present() {
        let operations = default_operations();
        for op in ["=", "!=", "<", ">", "<=", ">=", "first_of"] {
            assert!(operations.contains(op), "missing {op}");
        }
    }

    #[test]
    fn test_inputs_contain_feed_fields() {
        let inputs = default_inputs();
        assert!(inputs.contains("employee_id"));
        assert!(inputs.contains("birth_date"));
        assert!(!inputs.contains("$employee_id"));
    }
}
