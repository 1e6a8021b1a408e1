use ::anyhow::Result;
use ::anyhow::anyhow;
use ::rust_multipart_rfc7578_2::client::multipart::BoundaryGenerator;
use ::rust_multipart_rfc7578_2::client::multipart::Form;
use ::std::cell::RefCell;
use ::uuid::Uuid;

const MAX_BOUNDARY_LEN: usize = 70;

/// Characters which force the boundary to be quoted within the `Content-Type` header.
const BOUNDARY_TSPECIALS: &[char] = &[
    '(', ')', '<', '>', '@', ',', ';', ':', '\\', '"', '/', '[', ']', '?', '=', ' ',
];

thread_local! {
    static NEXT_BOUNDARY: RefCell<Option<String>> = const { RefCell::new(None) };
}

///
/// Hands a boundary chosen at runtime to [`Form::new()`],
/// which only accepts a generator type.
///
/// When no boundary has been handed over, a random one is used.
///
pub(crate) struct PresetBoundary;

impl PresetBoundary {
    /// Creates an empty form using the boundary given.
    ///
    /// The boundary must already have passed [`validate_boundary()`].
    pub(crate) fn new_form<'a>(boundary: String) -> Form<'a> {
        NEXT_BOUNDARY.set(Some(boundary));
        Form::new::<Self>()
    }
}

impl BoundaryGenerator for PresetBoundary {
    fn generate_boundary() -> String {
        NEXT_BOUNDARY.take().unwrap_or_else(new_random_boundary)
    }
}

pub(crate) fn new_random_boundary() -> String {
    Uuid::new_v4().simple().to_string()
}

/// The boundary must be between 1 and 70 characters,
/// use only the characters allowed by RFC 2046,
/// and must not end with a space.
pub(crate) fn validate_boundary(boundary: &str) -> Result<()> {
    if boundary.is_empty() || boundary.len() > MAX_BOUNDARY_LEN {
        return Err(anyhow!(
            "Invalid multipart boundary '{boundary}', it must be between 1 and {MAX_BOUNDARY_LEN} characters long"
        ));
    }

    if boundary.ends_with(' ') {
        return Err(anyhow!(
            "Invalid multipart boundary '{boundary}', it must not end with a space"
        ));
    }

    let invalid_char = boundary.chars().find(|c| !is_boundary_char(*c));
    if let Some(invalid_char) = invalid_char {
        return Err(anyhow!(
            "Invalid multipart boundary '{boundary}', character '{invalid_char}' is not allowed"
        ));
    }

    Ok(())
}

/// Returns the value to use for the `Content-Type` header,
/// when sending a body using this boundary.
pub(crate) fn form_data_content_type(boundary: &str) -> String {
    if boundary.contains(BOUNDARY_TSPECIALS) {
        format!(r#"multipart/form-data; boundary="{boundary}""#)
    } else {
        format!("multipart/form-data; boundary={boundary}")
    }
}

fn is_boundary_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '\'' | '(' | ')' | '+' | '_' | ',' | '-' | '.' | '/' | ':' | '=' | '?' | ' '
        )
}
