use super::{struct_type, GenericType, SemanticType, TypeArg};
use crate::{
    abi,
    eb::{factory, ExpressionBuilder},
    wtypes::WType,
};

use std::{cell::RefCell, rc::Rc};

use indexmap::IndexMap;
use quill_error::{
    error::CompileError,
    handler::{ErrorEmitted, Handler},
};
use quill_types::{
    constants::{ARC4_MODULE, ARC4_NAMED_UINT_BITS},
    SourceLocation,
};

/// What a name in type position refers to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Type(SemanticType),
    Generic(GenericType),
}

/// Parameterisations of generic types made during a compilation.
///
/// Clones share one cache, so the generic class builders handed out by a [TypeRegistry] intern
/// their types in the registry's cache. Identical parameterisations share their type data.
#[derive(Clone, Debug, Default)]
pub struct ParameterisedTypes {
    cache: Rc<RefCell<IndexMap<(GenericType, Vec<TypeArg>), SemanticType>>>,
}

impl ParameterisedTypes {
    pub fn parameterise(
        &self,
        handler: &Handler,
        generic: GenericType,
        args: &[TypeArg],
        location: &SourceLocation,
    ) -> Result<SemanticType, ErrorEmitted> {
        let key = (generic, args.to_vec());
        if let Some(typ) = self.cache.borrow().get(&key) {
            return Ok(typ.clone());
        }
        let typ = generic.parameterise(handler, args, location)?;
        tracing::debug!("parameterised {typ}");
        self.cache.borrow_mut().insert(key, typ.clone());
        Ok(typ)
    }

    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The catalogue of types known to a compilation, by fully qualified name.
#[derive(Debug)]
pub struct TypeRegistry {
    by_name: IndexMap<String, TypeRef>,
    parameterised: ParameterisedTypes,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        let mut registry = TypeRegistry {
            by_name: IndexMap::new(),
            parameterised: ParameterisedTypes::default(),
        };
        for typ in [
            SemanticType::None,
            SemanticType::Bool,
            SemanticType::UInt64,
            SemanticType::BigUInt,
            SemanticType::Bytes,
            SemanticType::String,
            SemanticType::Arc4Bool,
            SemanticType::Arc4String,
        ] {
            registry.insert_type(typ);
        }
        for typ in ARC4_NAMED_UINT_BITS
            .into_iter()
            .filter_map(SemanticType::arc4_uintn)
        {
            registry.insert_type(typ);
        }
        if let Some(byte) = SemanticType::arc4_uintn(8) {
            registry
                .by_name
                .insert(format!("{ARC4_MODULE}.Byte"), TypeRef::Type(byte));
        }
        for generic in [
            GenericType::Tuple,
            GenericType::Arc4Tuple,
            GenericType::Arc4DynamicArray,
            GenericType::Arc4StaticArray,
            GenericType::Arc4UIntN,
        ] {
            registry
                .by_name
                .insert(generic.name(), TypeRef::Generic(generic));
        }
        registry
    }
}

impl TypeRegistry {
    fn insert_type(&mut self, typ: SemanticType) {
        self.by_name.insert(typ.name(), TypeRef::Type(typ));
    }

    pub fn resolve(&self, name: &str) -> Option<&TypeRef> {
        self.by_name.get(name)
    }

    pub fn get(
        &self,
        handler: &Handler,
        name: &str,
        location: &SourceLocation,
    ) -> Result<&TypeRef, ErrorEmitted> {
        self.resolve(name).ok_or_else(|| {
            handler.emit_err(CompileError::UnknownType {
                name: name.to_string(),
                location: location.clone(),
            })
        })
    }

    /// Parameterises `generic`. Identical parameterisations share their type data.
    pub fn parameterise(
        &self,
        handler: &Handler,
        generic: GenericType,
        args: &[TypeArg],
        location: &SourceLocation,
    ) -> Result<SemanticType, ErrorEmitted> {
        self.parameterised
            .parameterise(handler, generic, args, location)
    }

    pub fn parameterised_types(&self) -> &ParameterisedTypes {
        &self.parameterised
    }

    /// Registers an ARC4 struct whose fields are laid out in declaration order.
    pub fn register_struct(
        &mut self,
        handler: &Handler,
        name: &str,
        fields: Vec<(String, SemanticType)>,
        location: &SourceLocation,
    ) -> Result<SemanticType, ErrorEmitted> {
        let mut wtypes: Vec<(String, WType)> = Vec::with_capacity(fields.len());
        for (field_name, typ) in &fields {
            if wtypes.iter().any(|(seen, _)| seen == field_name) {
                return Err(handler.emit_err(CompileError::DuplicateStructField {
                    struct_name: name.to_string(),
                    field_name: field_name.clone(),
                    location: location.clone(),
                }));
            }
            let wtype = typ.wtype().ok_or_else(|| {
                handler.emit_err(CompileError::InvalidElementType {
                    container: "struct",
                    type_name: typ.name(),
                    location: location.clone(),
                })
            })?;
            wtypes.push((field_name.clone(), wtype));
        }
        abi::make_struct_wtype(handler, name, &wtypes, location)?;
        let typ = struct_type(name, fields);
        tracing::debug!("registered struct {name}");
        self.by_name
            .insert(name.to_string(), TypeRef::Type(typ.clone()));
        Ok(typ)
    }

    /// The class builder for the type called `name`.
    pub fn class_builder(
        &self,
        handler: &Handler,
        name: &str,
        location: &SourceLocation,
    ) -> Result<ExpressionBuilder, ErrorEmitted> {
        let type_ref = self.get(handler, name, location)?;
        factory::builder_for_type_ref(handler, type_ref, &self.parameterised, location)
    }
}
