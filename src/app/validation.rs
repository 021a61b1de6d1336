use crate::app::error::ServiceError;

/// Trims `value`, then rejects it if blank or longer than `max_chars` characters.
pub fn required_text(
    value: Option<String>,
    field: &str,
    max_chars: usize,
) -> Result<String, ServiceError> {
    let Some(value) = value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    else {
        return Err(ServiceError::validation(format!("El campo '{}' es obligatorio", field)));
    };
    if value.chars().count() > max_chars {
        return Err(ServiceError::validation(format!(
            "El campo '{}' no debe superar los {} caracteres",
            field, max_chars
        )));
    }
    Ok(value)
}
