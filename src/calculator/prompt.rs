//! Email-preparation prompt
//!
//! The wording is fixed; only the submitted figures vary between requests.

use super::format::{format_currency, plain_number, to_fixed};
use super::submission::CalculatorSubmission;

/// Placeholder for optional inputs the consultant left empty
pub const NOT_PROVIDED: &str = "No provisto";

/// Placeholder for added revenue when it cannot be estimated
pub const NOT_APPLICABLE: &str = "No aplicable";

/// Render the generation prompt for one submission addressed to `recipient`.
pub fn render_prompt(submission: &CalculatorSubmission, recipient: &str) -> String {
    let inputs = &submission.inputs;
    let calculations = &submission.calculations;
    let plan = &submission.selected_bitrix_plan;

    let avg_sale_ticket = inputs
        .avg_sale_ticket_ars
        .map_or_else(|| NOT_PROVIDED.to_string(), |v| format_currency(Some(v)));
    let current_conversion = inputs
        .current_conversion_rate
        .map_or_else(|| NOT_PROVIDED.to_string(), plain_number);
    let expected_conversion = inputs
        .expected_conversion_rate_chatbot
        .map_or_else(|| NOT_PROVIDED.to_string(), plain_number);

    let added_revenue = if shows_added_revenue(submission) {
        format_currency(Some(calculations.estimated_added_revenue_ars))
    } else {
        NOT_APPLICABLE.to_string()
    };

    format!(
        r#"
Eres un asistente virtual para Efficiency24. Un usuario ha utilizado la calculadora de ROI.
Prepara el cuerpo de un correo electrónico profesional en texto plano para enviar a {recipient}.
El correo debe incluir la siguiente información de manera clara y organizada:

1. El correo electrónico del consultante.
2. Todos los datos que el consultante ingresó en la calculadora.
3. Todos los resultados que la calculadora generó para el consultante.

Aquí están los datos:

Correo del Consultante: {user_email}

Datos Ingresados:
- Consultas por mes: {inquiries}
- % Automatización Chatbot: {automation_chatbot}%
- Tiempo por Consulta (min): {time_per_inquiry}
- Horas CRM Mensuales (por empleado): {crm_hours}
- % Automatización CRM: {automation_crm}%
- Miembros del Equipo Involucrados: {team_members}
- Costo Hora Empleado (ARS): {hourly_cost}
- Plan Bitrix24 Seleccionado: {plan_name} ({plan_price} USD/mes)
- Costo Anual Licencia Bitrix24 (ARS): {license_cost} (a {exchange_rate} ARS/USD)
- Costo Implementación Fijo (ARS): {implementation_cost}
- Ticket Promedio Venta (ARS): {avg_sale_ticket}
- Tasa Conversión Actual (%): {current_conversion}
- Tasa Conversión Esperada con Chatbot (%): {expected_conversion}

Resultados Calculados:
- Total Horas Anuales Ahorradas: {hours_saved} horas
- Ahorro Anual Total de Costos (ARS): {cost_savings}
- Inversión Inicial Total (ARS): {investment}
- ROI Estimado: {roi}%
- Ingresos Anuales Adicionales Estimados (ARS): {added_revenue}

Formatea esto como el cuerpo de un correo electrónico. Comienza con un saludo apropiado (ej: "Saludos equipo Efficiency24,") e indica que es una nueva consulta de la calculadora. Finaliza con una sugerencia para contactar al consultante.
No incluyas un asunto en tu respuesta, solo el cuerpo del correo.
"#,
        user_email = submission.user_email,
        inquiries = plain_number(inputs.inquiries_per_month),
        automation_chatbot = plain_number(inputs.automation_percentage_chatbot),
        time_per_inquiry = plain_number(inputs.time_per_inquiry_minutes),
        crm_hours = plain_number(inputs.manual_crm_hours_monthly),
        automation_crm = plain_number(inputs.automation_percentage_crm),
        team_members = plain_number(inputs.team_members),
        hourly_cost = format_currency(Some(inputs.hourly_cost_ars)),
        plan_name = plan.name,
        plan_price = plain_number(plan.monthly_price_usd),
        license_cost = format_currency(Some(submission.annual_license_cost_ars)),
        exchange_rate = plain_number(submission.usd_to_ars_exchange_rate),
        implementation_cost = format_currency(Some(submission.fixed_implementation_cost_ars)),
        hours_saved = to_fixed(calculations.total_hours_saved_annual, 0),
        cost_savings = format_currency(Some(calculations.total_annual_cost_savings_ars)),
        investment = format_currency(Some(calculations.total_investment_ars)),
        roi = to_fixed(calculations.roi_percentage, 1),
    )
}

/// Added revenue is only meaningful with a positive ticket and a positive estimate
fn shows_added_revenue(submission: &CalculatorSubmission) -> bool {
    submission
        .inputs
        .avg_sale_ticket_ars
        .is_some_and(|ticket| ticket > 0.0)
        && submission.calculations.estimated_added_revenue_ars > 0.0
}
