//! Calculator submission payload and its schema validation
//!
//! The payload is validated field by field so a client gets every problem
//! at once instead of the first deserialization error.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Values the consultant typed into the calculator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorInputs {
    pub inquiries_per_month: f64,
    pub automation_percentage_chatbot: f64,
    pub time_per_inquiry_minutes: f64,
    pub manual_crm_hours_monthly: f64,
    pub automation_percentage_crm: f64,
    pub team_members: f64,
    pub hourly_cost_ars: f64,
    pub avg_sale_ticket_ars: Option<f64>,
    pub current_conversion_rate: Option<f64>,
    pub expected_conversion_rate_chatbot: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BitrixPlan {
    pub name: String,
    #[serde(rename = "monthlyPriceUSD")]
    pub monthly_price_usd: f64,
}

/// Results the calculator produced client-side; trusted as-is
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorResults {
    pub total_hours_saved_annual: f64,
    pub total_annual_cost_savings_ars: f64,
    pub total_investment_ars: f64,
    pub roi_percentage: f64,
    pub estimated_added_revenue_ars: f64,
}

/// Body of `POST /api/prepare-email`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorSubmission {
    pub user_email: String,
    pub inputs: CalculatorInputs,
    pub selected_bitrix_plan: BitrixPlan,
    pub annual_license_cost_ars: f64,
    pub fixed_implementation_cost_ars: f64,
    pub usd_to_ars_exchange_rate: f64,
    pub calculations: CalculatorResults,
}

/// One schema violation, addressed by its dotted JSON path
#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldError {
    path: String,
    reason: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// Every violation found in a payload, in document order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }

    fn push(&mut self, path: String, reason: &'static str) {
        self.0.push(FieldError { path, reason });
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Field reader over one JSON object that records problems instead of failing
struct Fields<'v, 'e> {
    prefix: &'static str,
    object: Option<&'v Map<String, Value>>,
    errors: &'e mut ValidationErrors,
}

impl<'v, 'e> Fields<'v, 'e> {
    fn new(value: &'v Value, errors: &'e mut ValidationErrors) -> Self {
        let object = value.as_object();
        if object.is_none() {
            errors.push("$".to_string(), "expected an object");
        }
        Self {
            prefix: "",
            object,
            errors,
        }
    }

    /// A missing parent object was already reported; its fields are not
    fn nested(
        parent: Option<&'v Map<String, Value>>,
        key: &'static str,
        errors: &'e mut ValidationErrors,
    ) -> Self {
        let object = match parent.map(|p| p.get(key)) {
            None => None,
            Some(None | Some(Value::Null)) => {
                errors.push(key.to_string(), "is required");
                None
            }
            Some(Some(value)) => {
                let object = value.as_object();
                if object.is_none() {
                    errors.push(key.to_string(), "expected an object");
                }
                object
            }
        };
        Self {
            prefix: key,
            object,
            errors,
        }
    }

    fn report(&mut self, key: &str, reason: &'static str) {
        let path = if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.prefix)
        };
        self.errors.push(path, reason);
    }

    fn number(&mut self, key: &str) -> f64 {
        let Some(object) = self.object else {
            return 0.0;
        };
        match object.get(key) {
            None | Some(Value::Null) => {
                self.report(key, "is required");
                0.0
            }
            Some(value) => {
                if let Some(number) = value.as_f64() {
                    number
                } else {
                    self.report(key, "expected a number");
                    0.0
                }
            }
        }
    }

    fn optional_number(&mut self, key: &str) -> Option<f64> {
        let object = self.object?;
        match object.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => {
                let number = value.as_f64();
                if number.is_none() {
                    self.report(key, "expected a number or null");
                }
                number
            }
        }
    }

    fn string(&mut self, key: &str) -> String {
        let Some(object) = self.object else {
            return String::new();
        };
        match object.get(key) {
            None | Some(Value::Null) => {
                self.report(key, "is required");
                String::new()
            }
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                self.report(key, "expected a string");
                String::new()
            }
        }
    }
}

impl CalculatorSubmission {
    /// Validate a parsed JSON body against the submission schema.
    ///
    /// Returns the typed submission, or every field error found.
    pub fn from_json(value: &Value) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let mut root = Fields::new(value, &mut errors);
        let user_email = root.string("userEmail");
        let annual_license_cost_ars = root.number("annualLicenseCostArs");
        let fixed_implementation_cost_ars = root.number("fixedImplementationCostArs");
        let usd_to_ars_exchange_rate = root.number("usdToArsExchangeRate");
        let object = root.object;

        let mut fields = Fields::nested(object, "inputs", &mut errors);
        let inputs = CalculatorInputs {
            inquiries_per_month: fields.number("inquiriesPerMonth"),
            automation_percentage_chatbot: fields.number("automationPercentageChatbot"),
            time_per_inquiry_minutes: fields.number("timePerInquiryMinutes"),
            manual_crm_hours_monthly: fields.number("manualCrmHoursMonthly"),
            automation_percentage_crm: fields.number("automationPercentageCrm"),
            team_members: fields.number("teamMembers"),
            hourly_cost_ars: fields.number("hourlyCostArs"),
            avg_sale_ticket_ars: fields.optional_number("avgSaleTicketArs"),
            current_conversion_rate: fields.optional_number("currentConversionRate"),
            expected_conversion_rate_chatbot: fields
                .optional_number("expectedConversionRateChatbot"),
        };

        let mut fields = Fields::nested(object, "selectedBitrixPlan", &mut errors);
        let selected_bitrix_plan = BitrixPlan {
            name: fields.string("name"),
            monthly_price_usd: fields.number("monthlyPriceUSD"),
        };

        let mut fields = Fields::nested(object, "calculations", &mut errors);
        let calculations = CalculatorResults {
            total_hours_saved_annual: fields.number("totalHoursSavedAnnual"),
            total_annual_cost_savings_ars: fields.number("totalAnnualCostSavingsArs"),
            total_investment_ars: fields.number("totalInvestmentArs"),
            roi_percentage: fields.number("roiPercentage"),
            estimated_added_revenue_ars: fields.number("estimatedAddedRevenueArs"),
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            user_email,
            inputs,
            selected_bitrix_plan,
            annual_license_cost_ars,
            fixed_implementation_cost_ars,
            usd_to_ars_exchange_rate,
            calculations,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::submission_json;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_submission() {
        let submission = CalculatorSubmission::from_json(&submission_json()).unwrap();
        assert_eq!(submission.user_email, "consultor@example.com");
        assert!((submission.inputs.inquiries_per_month - 100.0).abs() < f64::EPSILON);
        assert_eq!(submission.inputs.avg_sale_ticket_ars, None);
        assert_eq!(submission.selected_bitrix_plan.name, "Standard");
        assert!((submission.calculations.roi_percentage - 5.09).abs() < f64::EPSILON);
    }

    #[test]
    fn test_optional_fields_may_be_absent() {
        let mut value = submission_json();
        let inputs = value["inputs"].as_object_mut().unwrap();
        inputs.remove("avgSaleTicketArs");
        inputs.remove("currentConversionRate");
        inputs.insert("expectedConversionRateChatbot".into(), json!(4.5));

        let submission = CalculatorSubmission::from_json(&value).unwrap();
        assert_eq!(submission.inputs.avg_sale_ticket_ars, None);
        assert_eq!(submission.inputs.current_conversion_rate, None);
        assert_eq!(submission.inputs.expected_conversion_rate_chatbot, Some(4.5));
    }

    #[test]
    fn test_collects_every_error() {
        let mut value = submission_json();
        value["userEmail"] = json!(42);
        value["inputs"]["teamMembers"] = json!("three");
        value["inputs"]["avgSaleTicketArs"] = json!("mucho");
        value["calculations"].as_object_mut().unwrap().remove("roiPercentage");

        let errors = CalculatorSubmission::from_json(&value).unwrap_err();
        assert_eq!(
            errors.messages(),
            vec![
                "userEmail: expected a string",
                "inputs.teamMembers: expected a number",
                "inputs.avgSaleTicketArs: expected a number or null",
                "calculations.roiPercentage: is required",
            ]
        );
    }

    #[test]
    fn test_missing_nested_object_reported_once() {
        let mut value = submission_json();
        value.as_object_mut().unwrap().remove("selectedBitrixPlan");
        value["calculations"] = json!([1, 2]);

        let errors = CalculatorSubmission::from_json(&value).unwrap_err();
        assert_eq!(
            errors.messages(),
            vec!["selectedBitrixPlan: is required", "calculations: expected an object"]
        );
    }

    #[test]
    fn test_non_object_body() {
        let errors = CalculatorSubmission::from_json(&json!([])).unwrap_err();
        assert_eq!(errors.messages(), vec!["$: expected an object"]);
    }

    #[test]
    fn test_extra_keys_ignored() {
        let mut value = submission_json();
        value["utm_source"] = json!("newsletter");
        assert!(CalculatorSubmission::from_json(&value).is_ok());
    }
}
