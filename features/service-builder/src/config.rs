use std::borrow::Cow;

/// Prefixes of the method names a [`crate::Builder`] derives for its names
///
/// With the defaults, `meat` gets the setter `withMeat` and the getter `getMeat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    pub setter_prefix: Cow<'static, str>,
    pub getter_prefix: Cow<'static, str>,
}

impl Default for Naming {
    fn default() -> Self {
        Naming {
            setter_prefix: Cow::Borrowed("with"),
            getter_prefix: Cow::Borrowed("get"),
        }
    }
}

impl Naming {
    pub fn setter_name(&self, name: &str) -> String {
        camel_prepend(&self.setter_prefix, name)
    }

    pub fn getter_name(&self, name: &str) -> String {
        camel_prepend(&self.getter_prefix, name)
    }
}

fn camel_prepend(prefix: &str, name: &str) -> String {
    let mut chars = name.chars();
    let mut ret = String::with_capacity(prefix.len() + name.len());
    ret.push_str(prefix);
    if let Some(first) = chars.next() {
        ret.extend(first.to_uppercase());
        ret.push_str(chars.as_str());
    }
    ret
}
