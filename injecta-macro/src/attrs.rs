use syn::{Attribute, LitStr};

/// Dependency name override from `#[inject(name = "...")]`, if present.
pub fn inject_name(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut name = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("inject")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported inject option, expected `name`"))
            }
        })?;
    }
    Ok(name)
}

pub fn strip_inject(attrs: &mut Vec<Attribute>) {
    attrs.retain(|attr| !attr.path().is_ident("inject"));
}
