//! Request extractors.

use axum::{
    extract::{FromRequest, FromRequestParts, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use helptax_core::records::ExpenseInput;
use helptax_core::storage::InvoiceUpload;
use helptax_shared::{AppError, FieldError};
use rust_decimal::Decimal;

use crate::error::ApiError;

/// JSON body whose rejections use the API error shape.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Query string with API-shaped rejections.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

/// Path parameter; an unparsable id is reported as not found.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathId<T>(pub T);

/// Expense fields plus an optional invoice file.
///
/// Accepts `application/json` or `multipart/form-data`; in the latter the
/// file travels in the `factura` part and blank text parts count as absent.
#[derive(Debug)]
pub struct ExpensePayload {
    /// Expense fields.
    pub input: ExpenseInput,
    /// Uploaded invoice, if any.
    pub factura: Option<InvoiceUpload>,
}

fn multipart_error(err: &impl std::fmt::Display) -> ApiError {
    AppError::Validation(format!("Invalid multipart body: {err}")).into()
}

fn parse_field<T: std::str::FromStr>(
    name: &str,
    text: &str,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    text.parse().map_or_else(
        |_| {
            errors.push(FieldError::new(name, message));
            None
        },
        Some,
    )
}

impl<S> FromRequest<S> for ExpensePayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let JsonBody(input) = JsonBody::<ExpenseInput>::from_request(req, state).await?;
            return Ok(Self {
                input,
                factura: None,
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| multipart_error(&e.body_text()))?;

        let mut input = ExpenseInput::default();
        let mut factura = None;
        let mut errors = Vec::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(&e))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == "factura" {
                let filename = field.file_name().unwrap_or("factura").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(|e| multipart_error(&e))?;
                if !data.is_empty() {
                    factura = Some(InvoiceUpload {
                        filename,
                        content_type,
                        data,
                    });
                }
                continue;
            }

            let text = field.text().await.map_err(|e| multipart_error(&e))?;
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            match name.as_str() {
                "fecha" => {
                    input.fecha = parse_field(
                        &name,
                        text,
                        "Date has wrong format. Use YYYY-MM-DD.",
                        &mut errors,
                    );
                }
                "descripcion" => input.descripcion = Some(text.to_string()),
                "proveedor" => input.proveedor = Some(text.to_string()),
                "importe" => {
                    input.importe =
                        parse_field::<Decimal>(&name, text, "A valid number is required.", &mut errors);
                }
                "iva_porcentaje" => {
                    input.iva_porcentaje =
                        parse_field(&name, text, "A valid integer is required.", &mut errors);
                }
                "trimestre" => {
                    input.trimestre =
                        parse_field(&name, text, "A valid integer is required.", &mut errors);
                }
                "año" => {
                    input.year = parse_field(&name, text, "A valid integer is required.", &mut errors);
                }
                _ => {}
            }
        }

        if !errors.is_empty() {
            return Err(AppError::InvalidFields(errors).into());
        }

        Ok(Self { input, factura })
    }
}
