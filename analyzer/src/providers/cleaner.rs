use regex::Regex;
use serde::de::DeserializeOwned;

use common::ServiceError;

/// Parses model output that is JSON in spirit but occasionally carries a
/// trailing comma before a closing bracket. First try the text as-is, then
/// retry once with the trailing commas stripped.
pub fn try_parse_json_with_trailing_comma_removal<T: DeserializeOwned>(
    json_string: &str,
) -> Result<T, ServiceError> {
    match serde_json::from_str(json_string) {
        Ok(parsed) => Ok(parsed),
        Err(original_error) => {
            let cleaned_json_string = fix_trailing_commas(json_string);
            serde_json::from_str(&cleaned_json_string).map_err(|e| {
                ServiceError::MalformedResponse(format!(
                    "{e} (original error: {original_error})"
                ))
            })
        }
    }
}

fn fix_trailing_commas(json_str: &str) -> String {
    // ",]" or ",}" with optional whitespace becomes just "]" or "}"
    let re = Regex::new(r#",(\s*[\]}])"#).expect("valid regex literal");
    re.replace_all(json_str, "$1").to_string()
}
