//! Type descriptors
//!
//! Maps IR types to JVM descriptors (`I`, `Z`, `[I`, `Ljava/lang/String;`)
//! and class names to their internal, slash-separated form.

use crate::common::types::Type;
use std::collections::BTreeMap;
use thiserror::Error;

/// A type that has no JVM descriptor
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("no descriptor for type `{0}`")]
pub struct UnmappableType(pub Type);

/// Stateless type translation, qualified through a class's imports
#[derive(Clone, Debug, Default)]
pub struct DescriptorMapper {
    /// Simple class name → internal name (`C` → `a/b/C`)
    imports: BTreeMap<String, String>,
}

impl DescriptorMapper {
    pub fn new(imports: &[String]) -> Self {
        let imports = imports
            .iter()
            .map(|import| {
                let simple = import.rsplit('.').next().unwrap_or(import);
                (simple.to_string(), import.replace('.', "/"))
            })
            .collect();
        Self { imports }
    }

    /// Internal name of a class
    pub fn qualify(&self, class: &str) -> String {
        if let Some(qualified) = self.imports.get(class) {
            return qualified.clone();
        }
        match class {
            "String" => "java/lang/String".to_string(),
            "Object" => "java/lang/Object".to_string(),
            _ => class.to_string(),
        }
    }

    /// Internal name of a superclass, `java/lang/Object` when there is none
    pub fn super_class(&self, super_class: Option<&str>) -> String {
        super_class.map_or_else(|| "java/lang/Object".to_string(), |s| self.qualify(s))
    }

    /// Descriptor of a value type
    pub fn descriptor(&self, ty: &Type) -> Result<String, UnmappableType> {
        match ty {
            Type::Int32 => Ok("I".to_string()),
            Type::Boolean => Ok("Z".to_string()),
            Type::Void => Ok("V".to_string()),
            Type::ArrayOf(element) if element.is_void() => Err(UnmappableType(ty.clone())),
            Type::ArrayOf(element) => Ok(format!("[{}", self.descriptor(element)?)),
            Type::ClassRef(name) => Ok(format!("L{};", self.qualify(name))),
        }
    }

    /// Descriptor of a method: `(args)ret`
    pub fn method_descriptor<'t>(
        &self,
        params: impl IntoIterator<Item = &'t Type>,
        return_type: &Type,
    ) -> Result<String, UnmappableType> {
        let mut descriptor = String::from("(");
        for param in params {
            if param.is_void() {
                return Err(UnmappableType(param.clone()));
            }
            descriptor.push_str(&self.descriptor(param)?);
        }
        descriptor.push(')');
        descriptor.push_str(&self.descriptor(return_type)?);
        Ok(descriptor)
    }
}
