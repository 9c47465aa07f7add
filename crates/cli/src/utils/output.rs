//! Printing response envelopes

use crate::error::CliResult;
use pipeline_model::ConversionResponse;

/// Serialize the envelope as JSON.
pub fn render(response: &ConversionResponse, pretty: bool) -> CliResult<String> {
    let text = if pretty {
        serde_json::to_string_pretty(response)?
    } else {
        serde_json::to_string(response)?
    };
    Ok(text)
}

pub fn print_response(response: &ConversionResponse, pretty: bool) -> CliResult<()> {
    println!("{}", render(response, pretty)?);
    Ok(())
}

pub fn exit_code(response: &ConversionResponse) -> i32 {
    if response.is_success() {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_compact_and_pretty() {
        let response = ConversionResponse::failure(vec!["No result.".to_string()]);
        assert_eq!(
            render(&response, false).unwrap(),
            r#"{"result":"failure","errors":["No result."]}"#
        );
        assert!(render(&response, true).unwrap().contains("\n  \"errors\""));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&ConversionResponse::success()), 0);
        assert_eq!(exit_code(&ConversionResponse::failure(Vec::new())), 1);
    }
}
