//! Views over members and the tables keyed on them.

use crate::{
    metadata::{
        records::{CustomAttribute, EventMap, ModuleRef, PropertyMap, RecordView, TypeDef},
        tables::{CodedIndex, TableId},
    },
    Result,
};

#[allow(clippy::cast_possible_truncation)]
fn narrow(value: u32) -> u16 {
    value as u16
}

record_view! {
    /// A field definition (`0x04`).
    Field => Field
}

impl<'t> Field<'t> {
    /// `FieldAttributes` bits.
    ///
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn flags(&self) -> Result<u16> {
        Ok(narrow(self.0.column_at(0)?))
    }

    /// # Errors
    /// Returns an error if the name cannot be resolved.
    pub fn name(&self) -> Result<&'t str> {
        self.0.string(1)
    }

    /// # Errors
    /// Returns an error if the blob cannot be resolved.
    pub fn signature(&self) -> Result<&'t [u8]> {
        self.0.blob(2)
    }

    /// The type whose field run contains this field.
    ///
    /// # Errors
    /// Returns an error if `TypeDef` cannot be read.
    pub fn declaring_type(&self) -> Result<Option<TypeDef<'t>>> {
        let tables = self.0.tables();
        match tables.owner_of(TableId::TypeDef, 4, self.rid())? {
            Some(rid) => tables.get(rid).map(Some),
            None => Ok(None),
        }
    }

    /// # Errors
    /// Returns an error if `Constant` cannot be read.
    pub fn constant(&self) -> Result<Option<Constant<'t>>> {
        self.0.tables().constant(self.token())
    }

    /// # Errors
    /// Returns an error if `FieldMarshal` cannot be read.
    pub fn marshal(&self) -> Result<Option<FieldMarshal<'t>>> {
        self.0.tables().field_marshal(self.token())
    }

    /// # Errors
    /// Returns an error if `FieldLayout` cannot be read.
    pub fn layout(&self) -> Result<Option<FieldLayout<'t>>> {
        self.0.tables().field_layout(self.token())
    }

    /// # Errors
    /// Returns an error if `FieldRVA` cannot be read.
    pub fn rva(&self) -> Result<Option<FieldRva<'t>>> {
        self.0.tables().field_rva(self.token())
    }

    /// # Errors
    /// Returns an error if `CustomAttribute` cannot be read.
    pub fn custom_attributes(&self) -> Result<Vec<CustomAttribute<'t>>> {
        self.0.tables().custom_attributes(self.token())
    }
}

record_view! {
    /// A method definition (`0x06`).
    MethodDef => MethodDef
}

impl<'t> MethodDef<'t> {
    /// RVA of the method body, 0 for abstract and runtime-provided methods.
    ///
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn rva(&self) -> Result<u32> {
        self.0.column_at(0)
    }

    /// `MethodImplAttributes` bits.
    ///
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn impl_flags(&self) -> Result<u16> {
        Ok(narrow(self.0.column_at(1)?))
    }

    /// `MethodAttributes` bits.
    ///
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn flags(&self) -> Result<u16> {
        Ok(narrow(self.0.column_at(2)?))
    }

    /// # Errors
    /// Returns an error if the name cannot be resolved.
    pub fn name(&self) -> Result<&'t str> {
        self.0.string(3)
    }

    /// # Errors
    /// Returns an error if the blob cannot be resolved.
    pub fn signature(&self) -> Result<&'t [u8]> {
        self.0.blob(4)
    }

    /// Raw start of the parameter run.
    ///
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn param_list(&self) -> Result<u32> {
        self.0.column_at(5)
    }

    /// Parameter rows, the return value (sequence 0) included when present.
    ///
    /// # Errors
    /// Returns an error if the owning range cannot be read.
    pub fn params(&self) -> Result<Vec<Param<'t>>> {
        self.0.tables().owned(TableId::MethodDef, self.rid(), 5)
    }

    /// # Errors
    /// Returns an error if `TypeDef` cannot be read.
    pub fn declaring_type(&self) -> Result<Option<TypeDef<'t>>> {
        let tables = self.0.tables();
        match tables.owner_of(TableId::TypeDef, 5, self.rid())? {
            Some(rid) => tables.get(rid).map(Some),
            None => Ok(None),
        }
    }

    /// # Errors
    /// Returns an error if `GenericParam` cannot be read.
    pub fn generic_params(&self) -> Result<Vec<crate::metadata::records::GenericParam<'t>>> {
        self.0.tables().generic_params(self.token())
    }

    /// The P/Invoke mapping of this method.
    ///
    /// # Errors
    /// Returns an error if `ImplMap` cannot be read.
    pub fn impl_map(&self) -> Result<Option<ImplMap<'t>>> {
        self.0.tables().impl_map(self.token())
    }

    /// # Errors
    /// Returns an error if `CustomAttribute` cannot be read.
    pub fn custom_attributes(&self) -> Result<Vec<CustomAttribute<'t>>> {
        self.0.tables().custom_attributes(self.token())
    }
}

record_view! {
    /// A method parameter (`0x08`).
    Param => Param
}

impl<'t> Param<'t> {
    /// `ParamAttributes` bits.
    ///
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn flags(&self) -> Result<u16> {
        Ok(narrow(self.0.column_at(0)?))
    }

    /// 0 for the return value, 1 for the first parameter.
    ///
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn sequence(&self) -> Result<u16> {
        Ok(narrow(self.0.column_at(1)?))
    }

    /// # Errors
    /// Returns an error if the name cannot be resolved.
    pub fn name(&self) -> Result<&'t str> {
        self.0.string(2)
    }

    /// # Errors
    /// Returns an error if `MethodDef` cannot be read.
    pub fn declaring_method(&self) -> Result<Option<MethodDef<'t>>> {
        let tables = self.0.tables();
        match tables.owner_of(TableId::MethodDef, 5, self.rid())? {
            Some(rid) => tables.get(rid).map(Some),
            None => Ok(None),
        }
    }

    /// # Errors
    /// Returns an error if `Constant` cannot be read.
    pub fn constant(&self) -> Result<Option<Constant<'t>>> {
        self.0.tables().constant(self.token())
    }
}

record_view! {
    /// A reference to a field or method of another type (`0x0A`).
    MemberRef => MemberRef
}

impl<'t> MemberRef<'t> {
    /// # Errors
    /// Returns an error if the coded index is invalid.
    pub fn class(&self) -> Result<CodedIndex> {
        self.0.coded(0)
    }

    /// # Errors
    /// Returns an error if the name cannot be resolved.
    pub fn name(&self) -> Result<&'t str> {
        self.0.string(1)
    }

    /// # Errors
    /// Returns an error if the blob cannot be resolved.
    pub fn signature(&self) -> Result<&'t [u8]> {
        self.0.blob(2)
    }
}

record_view! {
    /// An event definition (`0x14`).
    Event => Event
}

impl<'t> Event<'t> {
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn flags(&self) -> Result<u16> {
        Ok(narrow(self.0.column_at(0)?))
    }

    /// # Errors
    /// Returns an error if the name cannot be resolved.
    pub fn name(&self) -> Result<&'t str> {
        self.0.string(1)
    }

    /// The delegate type of the event.
    ///
    /// # Errors
    /// Returns an error if the coded index is invalid.
    pub fn event_type(&self) -> Result<CodedIndex> {
        self.0.coded(2)
    }

    /// The type owning this event through `EventMap`.
    ///
    /// # Errors
    /// Returns an error if `EventMap` cannot be read.
    pub fn declaring_type(&self) -> Result<Option<TypeDef<'t>>> {
        let tables = self.0.tables();
        match tables.owner_of(TableId::EventMap, 1, self.rid())? {
            Some(rid) => tables.get::<EventMap>(rid)?.parent().map(Some),
            None => Ok(None),
        }
    }

    /// The add, remove, fire and other accessors.
    ///
    /// # Errors
    /// Returns an error if `MethodSemantics` cannot be read.
    pub fn accessors(&self) -> Result<Vec<MethodSemantics<'t>>> {
        self.0.tables().method_semantics(self.token())
    }
}

record_view! {
    /// A property definition (`0x17`).
    Property => Property
}

impl<'t> Property<'t> {
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn flags(&self) -> Result<u16> {
        Ok(narrow(self.0.column_at(0)?))
    }

    /// # Errors
    /// Returns an error if the name cannot be resolved.
    pub fn name(&self) -> Result<&'t str> {
        self.0.string(1)
    }

    /// # Errors
    /// Returns an error if the blob cannot be resolved.
    pub fn signature(&self) -> Result<&'t [u8]> {
        self.0.blob(2)
    }

    /// The type owning this property through `PropertyMap`.
    ///
    /// # Errors
    /// Returns an error if `PropertyMap` cannot be read.
    pub fn declaring_type(&self) -> Result<Option<TypeDef<'t>>> {
        let tables = self.0.tables();
        match tables.owner_of(TableId::PropertyMap, 1, self.rid())? {
            Some(rid) => tables.get::<PropertyMap>(rid)?.parent().map(Some),
            None => Ok(None),
        }
    }

    /// The getter, setter and other accessors.
    ///
    /// # Errors
    /// Returns an error if `MethodSemantics` cannot be read.
    pub fn accessors(&self) -> Result<Vec<MethodSemantics<'t>>> {
        self.0.tables().method_semantics(self.token())
    }

    /// # Errors
    /// Returns an error if `Constant` cannot be read.
    pub fn constant(&self) -> Result<Option<Constant<'t>>> {
        self.0.tables().constant(self.token())
    }
}

record_view! {
    /// Links an accessor method to its event or property (`0x18`).
    MethodSemantics => MethodSemantics
}

impl<'t> MethodSemantics<'t> {
    /// `MethodSemanticsAttributes` bits: setter 1, getter 2, other 4, add 8, remove 16, fire 32.
    ///
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn semantics(&self) -> Result<u16> {
        Ok(narrow(self.0.column_at(0)?))
    }

    /// # Errors
    /// Returns an error if the row is outside `MethodDef`.
    pub fn method(&self) -> Result<MethodDef<'t>> {
        self.0.tables().get(self.0.column_at(1)?)
    }

    /// # Errors
    /// Returns an error if the coded index is invalid.
    pub fn association(&self) -> Result<CodedIndex> {
        self.0.coded(2)
    }
}

record_view! {
    /// An explicit override (`0x19`).
    MethodImpl => MethodImpl
}

impl<'t> MethodImpl<'t> {
    /// # Errors
    /// Returns an error if the row is outside `TypeDef`.
    pub fn class(&self) -> Result<TypeDef<'t>> {
        self.0.tables().get(self.0.column_at(0)?)
    }

    /// # Errors
    /// Returns an error if the coded index is invalid.
    pub fn body(&self) -> Result<CodedIndex> {
        self.0.coded(1)
    }

    /// # Errors
    /// Returns an error if the coded index is invalid.
    pub fn declaration(&self) -> Result<CodedIndex> {
        self.0.coded(2)
    }
}

record_view! {
    /// A generic method instantiation (`0x2B`).
    MethodSpec => MethodSpec
}

impl<'t> MethodSpec<'t> {
    /// # Errors
    /// Returns an error if the coded index is invalid.
    pub fn method(&self) -> Result<CodedIndex> {
        self.0.coded(0)
    }

    /// # Errors
    /// Returns an error if the blob cannot be resolved.
    pub fn instantiation(&self) -> Result<&'t [u8]> {
        self.0.blob(1)
    }
}

record_view! {
    /// Explicit offset of a field (`0x10`).
    FieldLayout => FieldLayout
}

impl<'t> FieldLayout<'t> {
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn offset(&self) -> Result<u32> {
        self.0.column_at(0)
    }

    /// # Errors
    /// Returns an error if the row is outside `Field`.
    pub fn field(&self) -> Result<Field<'t>> {
        self.0.tables().get(self.0.column_at(1)?)
    }
}

record_view! {
    /// Initial data of a field (`0x1D`).
    FieldRva => FieldRVA
}

impl<'t> FieldRva<'t> {
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn rva(&self) -> Result<u32> {
        self.0.column_at(0)
    }

    /// # Errors
    /// Returns an error if the row is outside `Field`.
    pub fn field(&self) -> Result<Field<'t>> {
        self.0.tables().get(self.0.column_at(1)?)
    }
}

record_view! {
    /// Marshalling descriptor of a field or parameter (`0x0D`).
    FieldMarshal => FieldMarshal
}

impl<'t> FieldMarshal<'t> {
    /// # Errors
    /// Returns an error if the coded index is invalid.
    pub fn parent(&self) -> Result<CodedIndex> {
        self.0.coded(0)
    }

    /// # Errors
    /// Returns an error if the blob cannot be resolved.
    pub fn native_type(&self) -> Result<&'t [u8]> {
        self.0.blob(1)
    }
}

record_view! {
    /// Default value of a field, parameter or property (`0x0B`).
    Constant => Constant
}

impl<'t> Constant<'t> {
    /// The `ELEMENT_TYPE_*` of the value.
    ///
    /// # Errors
    /// Returns an error if the row cannot be read.
    #[allow(clippy::cast_possible_truncation)]
    pub fn element_type(&self) -> Result<u8> {
        Ok(self.0.column_at(0)? as u8)
    }

    /// # Errors
    /// Returns an error if the coded index is invalid.
    pub fn parent(&self) -> Result<CodedIndex> {
        self.0.coded(2)
    }

    /// Raw little-endian value bytes.
    ///
    /// # Errors
    /// Returns an error if the blob cannot be resolved.
    pub fn value(&self) -> Result<&'t [u8]> {
        self.0.blob(3)
    }
}

record_view! {
    /// P/Invoke mapping of a field or method (`0x1C`).
    ImplMap => ImplMap
}

impl<'t> ImplMap<'t> {
    /// `PInvokeAttributes` bits.
    ///
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn flags(&self) -> Result<u16> {
        Ok(narrow(self.0.column_at(0)?))
    }

    /// # Errors
    /// Returns an error if the coded index is invalid.
    pub fn member_forwarded(&self) -> Result<CodedIndex> {
        self.0.coded(1)
    }

    /// # Errors
    /// Returns an error if the name cannot be resolved.
    pub fn import_name(&self) -> Result<&'t str> {
        self.0.string(2)
    }

    /// The native module the entry point lives in.
    ///
    /// # Errors
    /// Returns an error if the row is outside `ModuleRef`.
    pub fn import_scope(&self) -> Result<ModuleRef<'t>> {
        self.0.tables().get(self.0.column_at(3)?)
    }
}

record_view! {
    /// A standalone signature, used for locals and `calli` (`0x11`).
    StandAloneSig => StandAloneSig
}

impl<'t> StandAloneSig<'t> {
    /// # Errors
    /// Returns an error if the blob cannot be resolved.
    pub fn signature(&self) -> Result<&'t [u8]> {
        self.0.blob(0)
    }
}
