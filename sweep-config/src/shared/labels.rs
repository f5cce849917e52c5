use crate::shared::ValidationError;

/// Maximum length of a label name and of a label value.
const MAX_LABEL_NAME_LEN: usize = 63;

/// Maximum length of the DNS subdomain prefix of a label key.
const MAX_LABEL_PREFIX_LEN: usize = 253;

/// Validates a label pair against the Kubernetes label syntax.
///
/// Keys are `[prefix/]name`, names and values are at most 63 characters,
/// start and end with an alphanumeric character and otherwise contain only
/// `-`, `_` and `.`. Values may be empty.
pub fn validate_label(key: &str, value: &str) -> Result<(), ValidationError> {
    let invalid = |reason| ValidationError::InvalidLabel {
        key: key.to_owned(),
        value: value.to_owned(),
        reason,
    };

    let name = match key.rsplit_once('/') {
        Some((prefix, name)) => {
            if !is_dns_subdomain(prefix) {
                return Err(invalid("key prefix must be a DNS subdomain"));
            }
            name
        }
        None => key,
    };

    if name.is_empty() {
        return Err(invalid("key name cannot be empty"));
    }
    if !is_label_token(name) {
        return Err(invalid("key name is not a valid label name"));
    }
    if !value.is_empty() && !is_label_token(value) {
        return Err(invalid("value is not a valid label value"));
    }

    Ok(())
}

fn is_label_token(token: &str) -> bool {
    let bytes = token.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };

    token.len() <= MAX_LABEL_NAME_LEN
        && first.is_ascii_alphanumeric()
        && last.is_ascii_alphanumeric()
        && bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

fn is_dns_subdomain(prefix: &str) -> bool {
    !prefix.is_empty()
        && prefix.len() <= MAX_LABEL_PREFIX_LEN
        && prefix.split('.').all(|part| {
            let bytes = part.as_bytes();
            matches!(
                (bytes.first(), bytes.last()),
                (Some(first), Some(last))
                    if first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric()
            ) && bytes
                .iter()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        })
}
