use crate::types::{Form, Rig};

/// Split a composite `{rig and form}` directory token into its parts.
///
/// The token concatenates a rig name and a form keyword in either order,
/// e.g. `"Bruel & Kjaer 5128 in-ear"` or `"over-ear HMS II.3"`. The form
/// keyword is located case-insensitively; what remains after removing it is
/// the rig. A token without a recognized keyword yields `Form::Unknown` and
/// the whole token as the rig.
///
/// This is a best-effort heuristic, not a grammar: a rig name that embeds a
/// form keyword as a substring would be truncated. The source data does not
/// produce such names today and nothing here validates against it.
pub fn parse_rig_and_form(token: &str) -> (Rig, Form) {
    let lower = token.to_lowercase();

    for form in Form::KNOWN {
        let keyword = form.keyword();
        if let Some(pos) = lower.find(keyword) {
            let end = pos + keyword.len();
            // Offsets come from the lowercased copy; fall back to it when
            // case folding moved a character boundary.
            let rest = if token.is_char_boundary(pos) && token.is_char_boundary(end) {
                format!("{}{}", &token[..pos], &token[end..])
            } else {
                format!("{}{}", &lower[..pos], &lower[end..])
            };
            return (Rig::from_label(rest.trim()), form);
        }
    }

    (Rig::from_label(token), Form::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rig_then_form() {
        let (rig, form) = parse_rig_and_form("Bruel & Kjaer 5128 in-ear");
        assert_eq!(rig, Rig::Named("Bruel & Kjaer 5128".to_string()));
        assert_eq!(form, Form::InEar);
    }

    #[test]
    fn test_form_then_rig() {
        let (rig, form) = parse_rig_and_form("over-ear HMS II.3");
        assert_eq!(rig, Rig::Named("HMS II.3".to_string()));
        assert_eq!(form, Form::OverEar);
    }

    #[test]
    fn test_case_insensitive_keyword() {
        let (rig, form) = parse_rig_and_form("GRAS 43AG-7 Over-Ear");
        assert_eq!(rig, Rig::Named("GRAS 43AG-7".to_string()));
        assert_eq!(form, Form::OverEar);
    }

    #[test]
    fn test_form_only() {
        let (rig, form) = parse_rig_and_form("earbud");
        assert!(rig.is_unknown());
        assert_eq!(form, Form::Earbud);
    }

    #[test]
    fn test_no_keyword() {
        let (rig, form) = parse_rig_and_form("HMS II.3");
        assert_eq!(rig, Rig::Named("HMS II.3".to_string()));
        assert_eq!(form, Form::Unknown);
    }

    #[test]
    fn test_empty_token() {
        let (rig, form) = parse_rig_and_form("");
        assert!(rig.is_unknown());
        assert_eq!(form, Form::Unknown);
    }
}
