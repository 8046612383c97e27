//! Views over the type tables.

use crate::{
    metadata::{
        records::{CustomAttribute, Event, Field, MethodDef, Property, RecordView},
        tables::{CodedIndex, TableId},
    },
    Result,
};

record_view! {
    /// A type reference (`0x01`), resolved through its scope.
    TypeRef => TypeRef
}

impl<'t> TypeRef<'t> {
    /// The module, module ref, assembly ref or enclosing type ref the name is scoped to.
    ///
    /// # Errors
    /// Returns an error if the coded index is invalid.
    pub fn resolution_scope(&self) -> Result<CodedIndex> {
        self.0.coded(0)
    }

    /// # Errors
    /// Returns an error if the name cannot be resolved.
    pub fn name(&self) -> Result<&'t str> {
        self.0.string(1)
    }

    /// # Errors
    /// Returns an error if the namespace cannot be resolved.
    pub fn namespace(&self) -> Result<&'t str> {
        self.0.string(2)
    }
}

record_view! {
    /// A type definition (`0x02`).
    ///
    /// Row 1 is the `<Module>` pseudo-type holding global fields and methods.
    TypeDef => TypeDef
}

impl<'t> TypeDef<'t> {
    /// `TypeAttributes` bits.
    ///
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn flags(&self) -> Result<u32> {
        self.0.column_at(0)
    }

    /// # Errors
    /// Returns an error if the name cannot be resolved.
    pub fn name(&self) -> Result<&'t str> {
        self.0.string(1)
    }

    /// # Errors
    /// Returns an error if the namespace cannot be resolved.
    pub fn namespace(&self) -> Result<&'t str> {
        self.0.string(2)
    }

    /// The base type, or a null index for `System.Object`, interfaces and `<Module>`.
    ///
    /// # Errors
    /// Returns an error if the coded index is invalid.
    pub fn extends(&self) -> Result<CodedIndex> {
        self.0.coded(3)
    }

    /// Raw start of the field run.
    ///
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn field_list(&self) -> Result<u32> {
        self.0.column_at(4)
    }

    /// Raw start of the method run.
    ///
    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn method_list(&self) -> Result<u32> {
        self.0.column_at(5)
    }

    /// Fields declared by this type, in declaration order.
    ///
    /// # Errors
    /// Returns an error if the owning range cannot be read.
    pub fn fields(&self) -> Result<Vec<Field<'t>>> {
        self.0.tables().owned(TableId::TypeDef, self.rid(), 4)
    }

    /// Methods declared by this type, in declaration order.
    ///
    /// # Errors
    /// Returns an error if the owning range cannot be read.
    pub fn methods(&self) -> Result<Vec<MethodDef<'t>>> {
        self.0.tables().owned(TableId::TypeDef, self.rid(), 5)
    }

    /// Events declared by this type, through `EventMap`.
    ///
    /// # Errors
    /// Returns an error if the map or the owning range cannot be read.
    pub fn events(&self) -> Result<Vec<Event<'t>>> {
        let tables = self.0.tables();
        match tables.find_by_column::<EventMap>(self.token(), 0)?.first() {
            Some(map) => tables.owned(TableId::EventMap, map.rid(), 1),
            None => Ok(Vec::new()),
        }
    }

    /// Properties declared by this type, through `PropertyMap`.
    ///
    /// # Errors
    /// Returns an error if the map or the owning range cannot be read.
    pub fn properties(&self) -> Result<Vec<Property<'t>>> {
        let tables = self.0.tables();
        match tables.find_by_column::<PropertyMap>(self.token(), 0)?.first() {
            Some(map) => tables.owned(TableId::PropertyMap, map.rid(), 1),
            None => Ok(Vec::new()),
        }
    }

    /// Types nested directly in this one.
    ///
    /// # Errors
    /// Returns an error if `NestedClass` cannot be read.
    pub fn nested_types(&self) -> Result<Vec<TypeDef<'t>>> {
        self.0
            .tables()
            .nested_classes(self.token())?
            .iter()
            .map(NestedClass::nested_class)
            .collect()
    }

    /// The type this one is nested in.
    ///
    /// # Errors
    /// Returns an error if `NestedClass` cannot be read.
    pub fn enclosing_type(&self) -> Result<Option<TypeDef<'t>>> {
        self.0.tables().enclosing_class(self.token())
    }

    /// Interfaces this type implements.
    ///
    /// # Errors
    /// Returns an error if `InterfaceImpl` cannot be read.
    pub fn interfaces(&self) -> Result<Vec<InterfaceImpl<'t>>> {
        self.0.tables().interface_impls(self.token())
    }

    /// The explicit layout, if any.
    ///
    /// # Errors
    /// Returns an error if `ClassLayout` cannot be read.
    pub fn layout(&self) -> Result<Option<ClassLayout<'t>>> {
        self.0.tables().class_layout(self.token())
    }

    /// Generic parameters, ordered by number.
    ///
    /// # Errors
    /// Returns an error if `GenericParam` cannot be read.
    pub fn generic_params(&self) -> Result<Vec<GenericParam<'t>>> {
        self.0.tables().generic_params(self.token())
    }

    /// # Errors
    /// Returns an error if `CustomAttribute` cannot be read.
    pub fn custom_attributes(&self) -> Result<Vec<CustomAttribute<'t>>> {
        self.0.tables().custom_attributes(self.token())
    }
}

record_view! {
    /// A type specification (`0x1B`): a signature blob for instantiated or constructed types.
    TypeSpec => TypeSpec
}

impl<'t> TypeSpec<'t> {
    /// # Errors
    /// Returns an error if the blob cannot be resolved.
    pub fn signature(&self) -> Result<&'t [u8]> {
        self.0.blob(0)
    }
}

record_view! {
    /// Nesting of one type in another (`0x29`).
    NestedClass => NestedClass
}

impl<'t> NestedClass<'t> {
    /// # Errors
    /// Returns an error if the row is outside `TypeDef`.
    pub fn nested_class(&self) -> Result<TypeDef<'t>> {
        self.0.tables().get(self.0.column_at(0)?)
    }

    /// # Errors
    /// Returns an error if the row is outside `TypeDef`.
    pub fn enclosing_class(&self) -> Result<TypeDef<'t>> {
        self.0.tables().get(self.0.column_at(1)?)
    }
}

record_view! {
    /// An interface implemented by a type (`0x09`).
    InterfaceImpl => InterfaceImpl
}

impl<'t> InterfaceImpl<'t> {
    /// # Errors
    /// Returns an error if the row is outside `TypeDef`.
    pub fn class(&self) -> Result<TypeDef<'t>> {
        self.0.tables().get(self.0.column_at(0)?)
    }

    /// # Errors
    /// Returns an error if the coded index is invalid.
    pub fn interface(&self) -> Result<CodedIndex> {
        self.0.coded(1)
    }
}

record_view! {
    /// Explicit packing and size of a type (`0x0F`).
    ClassLayout => ClassLayout
}

impl<'t> ClassLayout<'t> {
    /// # Errors
    /// Returns an error if the row cannot be read.
    #[allow(clippy::cast_possible_truncation)]
    pub fn packing_size(&self) -> Result<u16> {
        Ok(self.0.column_at(0)? as u16)
    }

    /// # Errors
    /// Returns an error if the row cannot be read.
    pub fn class_size(&self) -> Result<u32> {
        self.0.column_at(1)
    }

    /// # Errors
    /// Returns an error if the row is outside `TypeDef`.
    pub fn parent(&self) -> Result<TypeDef<'t>> {
        self.0.tables().get(self.0.column_at(2)?)
    }
}

record_view! {
    /// The first event of a type's event run (`0x12`).
    EventMap => EventMap
}

impl<'t> EventMap<'t> {
    /// # Errors
    /// Returns an error if the row is outside `TypeDef`.
    pub fn parent(&self) -> Result<TypeDef<'t>> {
        self.0.tables().get(self.0.column_at(0)?)
    }
}

record_view! {
    /// The first property of a type's property run (`0x15`).
    PropertyMap => PropertyMap
}

impl<'t> PropertyMap<'t> {
    /// # Errors
    /// Returns an error if the row is outside `TypeDef`.
    pub fn parent(&self) -> Result<TypeDef<'t>> {
        self.0.tables().get(self.0.column_at(0)?)
    }
}

record_view! {
    /// A generic parameter of a type or method (`0x2A`).
    GenericParam => GenericParam
}

impl<'t> GenericParam<'t> {
    /// Position in the owner's parameter list.
    ///
    /// # Errors
    /// Returns an error if the row cannot be read.
    #[allow(clippy::cast_possible_truncation)]
    pub fn number(&self) -> Result<u16> {
        Ok(self.0.column_at(0)? as u16)
    }

    /// `GenericParamAttributes` bits.
    ///
    /// # Errors
    /// Returns an error if the row cannot be read.
    #[allow(clippy::cast_possible_truncation)]
    pub fn flags(&self) -> Result<u16> {
        Ok(self.0.column_at(1)? as u16)
    }

    /// The `TypeDef` or `MethodDef` declaring the parameter.
    ///
    /// # Errors
    /// Returns an error if the coded index is invalid.
    pub fn owner(&self) -> Result<CodedIndex> {
        self.0.coded(2)
    }

    /// # Errors
    /// Returns an error if the name cannot be resolved.
    pub fn name(&self) -> Result<&'t str> {
        self.0.string(3)
    }

    /// # Errors
    /// Returns an error if `GenericParamConstraint` cannot be read.
    pub fn constraints(&self) -> Result<Vec<GenericParamConstraint<'t>>> {
        self.0.tables().generic_param_constraints(self.token())
    }
}

record_view! {
    /// A constraint on a generic parameter (`0x2C`).
    GenericParamConstraint => GenericParamConstraint
}

impl<'t> GenericParamConstraint<'t> {
    /// # Errors
    /// Returns an error if the row is outside `GenericParam`.
    pub fn owner(&self) -> Result<GenericParam<'t>> {
        self.0.tables().get(self.0.column_at(0)?)
    }

    /// # Errors
    /// Returns an error if the coded index is invalid.
    pub fn constraint(&self) -> Result<CodedIndex> {
        self.0.coded(1)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        metadata::{records::RecordView, tables::TableId},
        test::ImageBuilder,
        ModuleView,
    };

    #[test]
    fn type_navigation() {
        let view = ModuleView::from_mem(ImageBuilder::new().build()).unwrap();
        let tables = view.tables();

        let types: Vec<_> = tables.type_defs().collect();
        assert_eq!(types[0].name().unwrap(), "<Module>");
        assert!(types[0].extends().unwrap().is_null());
        assert!(types[0].fields().unwrap().is_empty());

        let program = types[1];
        assert_eq!(program.name().unwrap(), "Program");
        assert_eq!(program.namespace().unwrap(), "Sample");
        assert_eq!(program.extends().unwrap().tag, TableId::TypeRef);

        let fields: Vec<_> = program
            .fields()
            .unwrap()
            .iter()
            .map(|field| field.name().unwrap())
            .collect();
        assert_eq!(fields, vec!["counter", "label"]);

        let methods: Vec<_> = program
            .methods()
            .unwrap()
            .iter()
            .map(|method| method.name().unwrap())
            .collect();
        assert_eq!(methods, vec!["Main", ".ctor"]);

        let nested = program.nested_types().unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].name().unwrap(), "Inner");
        assert_eq!(
            nested[0].enclosing_type().unwrap().map(|ty| ty.rid()),
            Some(2)
        );

        let events = program.events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name().unwrap(), "Changed");
        assert!(types[2].events().unwrap().is_empty());

        let properties = program.properties().unwrap();
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].name().unwrap(), "Label");

        assert_eq!(program.custom_attributes().unwrap().len(), 2);
        assert!(program.interfaces().unwrap().is_empty());
        assert!(program.layout().unwrap().is_none());
    }

    #[test]
    fn type_refs() {
        let view = ModuleView::from_mem(ImageBuilder::new().build()).unwrap();
        let tables = view.tables();

        let object = tables.type_refs().next().unwrap();
        assert_eq!(object.namespace().unwrap(), "System");
        assert_eq!(object.name().unwrap(), "Object");
        assert_eq!(
            object.resolution_scope().unwrap().tag,
            TableId::AssemblyRef
        );
    }
}
