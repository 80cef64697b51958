//! Email address fields: recipient, sender, cc and bcc

use tracing::{debug, warn};
use validator::ValidateEmail;

use super::{FieldValueResolver, ResolutionContext};
use crate::content::ValueProperty;
use crate::error::{InfoCollectionError, Result};

/// Whether `address` is a syntactically valid email address
#[must_use]
pub fn is_valid_email(address: &str) -> bool {
    address.to_string().validate_email()
}

/// Split a comma separated list and keep the valid addresses
///
/// Tokens are trimmed, invalid tokens are dropped and duplicates collapse
/// onto their first occurrence. Order is preserved.
///
/// # Examples
///
/// ```rust
/// use info_collection::resolver::parse_address_list;
///
/// let addresses = parse_address_list("a@x.com, not-an-email, b@x.com");
/// assert_eq!(addresses, vec!["a@x.com", "b@x.com"]);
/// ```
#[must_use]
pub fn parse_address_list(list: &str) -> Vec<String> {
    let mut addresses: Vec<String> = Vec::new();
    for token in list.split(',').map(str::trim) {
        if is_valid_email(token) && !addresses.iter().any(|a| a == token) {
            addresses.push(token.to_string());
        }
    }
    addresses
}

/// Resolves multi-valued, validated address fields
///
/// Uses the same three tiers as [`FieldValueResolver`], with these
/// differences: a rendered block is a comma separated list filtered down to
/// valid addresses, a content field contributes its single email address,
/// and a config default is used only if it is itself a valid address. A
/// block whose every token is invalid falls through to the content field
/// rather than failing.
#[derive(Clone)]
pub struct EmailAddressResolver {
    values: FieldValueResolver,
}

impl EmailAddressResolver {
    /// Create an address resolver sharing the text resolver's sources
    #[must_use]
    pub const fn new(values: FieldValueResolver) -> Self {
        Self { values }
    }

    /// Resolve a required address field
    ///
    /// # Errors
    ///
    /// Returns `InfoCollectionError::MissingValue` when no source yields an
    /// address, or a template error if the block fails to render
    pub fn resolve(&self, ctx: &ResolutionContext<'_>, field: &str) -> Result<Vec<String>> {
        if let Some(addresses) = Self::block_addresses(ctx, field)? {
            return Ok(addresses);
        }

        if let Some(address) = self
            .values
            .content_value(ctx.content(), field, ValueProperty::Email)
        {
            debug!(field, source = "content", "Resolved address field");
            return Ok(vec![address]);
        }

        if let Some(default) = self.values.default_value(field) {
            let default = default.trim();
            if is_valid_email(default) {
                debug!(field, source = "config", "Resolved address field");
                return Ok(vec![default.to_string()]);
            }
            warn!(field, default, "Ignoring invalid default address");
        }

        Err(InfoCollectionError::missing_value(field))
    }

    /// Resolve an optional address field such as `cc`
    ///
    /// An exhausted field yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns a template error if the block fails to render
    pub fn resolve_optional(
        &self,
        ctx: &ResolutionContext<'_>,
        field: &str,
    ) -> Result<Vec<String>> {
        match self.resolve(ctx, field) {
            Err(InfoCollectionError::MissingValue(_)) => Ok(Vec::new()),
            other => other,
        }
    }

    /// Resolve an address field from the submission itself
    ///
    /// Used by the auto responder: the block named `field` wins, otherwise
    /// the submitted value of `submitted_field` is used if it is a valid
    /// address.
    ///
    /// # Errors
    ///
    /// Returns `InfoCollectionError::MissingValue` naming `field` when
    /// neither source yields an address
    pub fn resolve_submitted(
        &self,
        ctx: &ResolutionContext<'_>,
        field: &str,
        submitted_field: &str,
    ) -> Result<Vec<String>> {
        if let Some(addresses) = Self::block_addresses(ctx, field)? {
            return Ok(addresses);
        }

        let submitted = ctx
            .event()
            .collected
            .get(submitted_field)
            .and_then(|value| {
                value
                    .property(ValueProperty::Email)
                    .or_else(|| value.property(ValueProperty::Text))
            })
            .map(|address| address.trim().to_string())
            .filter(|address| is_valid_email(address));

        if let Some(address) = submitted {
            debug!(field, submitted_field, source = "submission", "Resolved address field");
            return Ok(vec![address]);
        }

        Err(InfoCollectionError::missing_value(field))
    }

    fn block_addresses(ctx: &ResolutionContext<'_>, field: &str) -> Result<Option<Vec<String>>> {
        let Some(rendered) = ctx.render_field_block(field)? else {
            return Ok(None);
        };

        let addresses = parse_address_list(&rendered);
        if addresses.is_empty() {
            debug!(field, %rendered, "Block rendered no valid address");
            return Ok(None);
        }

        debug!(field, count = addresses.len(), source = "block", "Resolved address field");
        Ok(Some(addresses))
    }
}
