// src/services/field_presets.rs

use crate::models::custom_field::{CustomFieldDefinition, FieldType};

// As categorias que têm um conjunto de campos pronto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetCategory {
    Auto,
    Moto,
    Bicicleta,
    Hogar,
    Vida,
    Salud,
    Viaje,
    Mascotas,
    Generic,
}

// Ordem de busca quando o nome apenas contém a categoria
const KNOWN: [(&str, PresetCategory); 8] = [
    ("auto", PresetCategory::Auto),
    ("moto", PresetCategory::Moto),
    ("bicicleta", PresetCategory::Bicicleta),
    ("hogar", PresetCategory::Hogar),
    ("vida", PresetCategory::Vida),
    ("salud", PresetCategory::Salud),
    ("viaje", PresetCategory::Viaje),
    ("mascotas", PresetCategory::Mascotas),
];

impl PresetCategory {
    /// Categoria de um nome de tipo: igualdade exata (sem maiúsculas/espaços), depois
    /// a primeira categoria contida no nome ("Seguro de Auto" -> Auto), senão genérica.
    pub fn for_type_name(name: &str) -> Self {
        let normalized = name.trim().to_lowercase();

        KNOWN
            .iter()
            .find(|(key, _)| *key == normalized)
            .or_else(|| KNOWN.iter().find(|(key, _)| normalized.contains(key)))
            .map(|(_, category)| *category)
            .unwrap_or(PresetCategory::Generic)
    }
}

/// Campos sugeridos para um tipo recém-criado. Cada chamada gera ids novos.
pub fn default_fields(type_name: &str) -> Vec<CustomFieldDefinition> {
    use FieldType::*;
    let field = CustomFieldDefinition::new;

    match PresetCategory::for_type_name(type_name) {
        PresetCategory::Auto => vec![
            field("marca", "Marca", Text).required().with_placeholder("Ej: Ford"),
            field("modelo", "Modelo", Text).required().with_placeholder("Ej: Focus"),
            field("año", "Año", Number).required().with_bounds(Some(1900.0), Some(2100.0)),
            field("patente", "Patente", Text).required().with_placeholder("Ej: AB123CD"),
            field("numero_chasis", "Número de chasis", Text),
            field("numero_motor", "Número de motor", Text),
            field("color", "Color", Text),
            field("combustible", "Combustible", Select)
                .with_options(&["Nafta", "Diesel", "GNC", "Eléctrico", "Híbrido"]),
        ],
        PresetCategory::Moto => vec![
            field("marca", "Marca", Text).required().with_placeholder("Ej: Honda"),
            field("modelo", "Modelo", Text).required(),
            field("año", "Año", Number).required().with_bounds(Some(1900.0), Some(2100.0)),
            field("patente", "Patente", Text).required(),
            field("cilindrada", "Cilindrada (cc)", Number).with_bounds(Some(0.0), None),
            field("numero_chasis", "Número de chasis", Text),
            field("numero_motor", "Número de motor", Text),
        ],
        PresetCategory::Bicicleta => vec![
            field("marca", "Marca", Text).required(),
            field("modelo", "Modelo", Text),
            field("tipo", "Tipo", Select)
                .with_options(&["Urbana", "Montaña", "Ruta", "Eléctrica", "Plegable"]),
            field("numero_serie", "Número de serie", Text),
            field("valor", "Valor", Number).with_bounds(Some(0.0), None),
        ],
        PresetCategory::Hogar => vec![
            field("direccion", "Dirección", Text).required(),
            field("tipo_vivienda", "Tipo de vivienda", Select)
                .with_options(&["Casa", "Departamento", "PH", "Country"]),
            field("superficie_m2", "Superficie (m²)", Number).with_bounds(Some(0.0), None),
            field("antiguedad", "Antigüedad (años)", Number).with_bounds(Some(0.0), None),
            field("valor_edificio", "Valor del edificio", Number).with_bounds(Some(0.0), None),
            field("valor_contenido", "Valor del contenido", Number).with_bounds(Some(0.0), None),
        ],
        PresetCategory::Vida => vec![
            field("beneficiarios", "Beneficiarios", Textarea).required(),
            field("suma_asegurada", "Suma asegurada", Number)
                .required()
                .with_bounds(Some(0.0), None),
            field("fecha_nacimiento_asegurado", "Fecha de nacimiento del asegurado", Date),
            field("ocupacion", "Ocupación", Text),
            field("fumador", "Fumador", Select).with_options(&["Sí", "No"]),
        ],
        PresetCategory::Salud => vec![
            field("plan", "Plan", Text).required(),
            field("numero_afiliado", "Número de afiliado", Text),
            field("grupo_familiar", "Integrantes del grupo familiar", Number)
                .with_bounds(Some(1.0), None),
            field("preexistencias", "Preexistencias", Textarea),
        ],
        PresetCategory::Viaje => vec![
            field("destino", "Destino", Text).required(),
            field("fecha_salida", "Fecha de salida", Date).required(),
            field("fecha_regreso", "Fecha de regreso", Date).required(),
            field("cantidad_viajeros", "Cantidad de viajeros", Number)
                .with_bounds(Some(1.0), None),
            field("motivo", "Motivo", Select).with_options(&["Turismo", "Negocios", "Estudio"]),
        ],
        PresetCategory::Mascotas => vec![
            field("nombre_mascota", "Nombre de la mascota", Text).required(),
            field("especie", "Especie", Select)
                .required()
                .with_options(&["Perro", "Gato", "Otro"]),
            field("raza", "Raza", Text),
            field("edad", "Edad (años)", Number).with_bounds(Some(0.0), None),
            field("numero_microchip", "Número de microchip", Text),
        ],
        PresetCategory::Generic => vec![
            field("descripcion", "Descripción", Textarea).required(),
            field("valor_asegurado", "Valor asegurado", Number).with_bounds(Some(0.0), None),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn names(fields: &[CustomFieldDefinition]) -> Vec<&str> {
        fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn auto_preset_has_eight_fields_in_order() {
        let fields = default_fields("Auto");
        assert_eq!(
            names(&fields),
            vec![
                "marca", "modelo", "año", "patente",
                "numero_chasis", "numero_motor", "color", "combustible"
            ]
        );
        let required: Vec<&str> = fields.iter().filter(|f| f.required).map(|f| f.name.as_str()).collect();
        assert_eq!(required, vec!["marca", "modelo", "año", "patente"]);
    }

    #[test]
    fn category_matching_is_forgiving() {
        assert_eq!(PresetCategory::for_type_name("  AUTO "), PresetCategory::Auto);
        assert_eq!(PresetCategory::for_type_name("Seguro de Hogar"), PresetCategory::Hogar);
        assert_eq!(PresetCategory::for_type_name("Mascotas"), PresetCategory::Mascotas);
        assert_eq!(PresetCategory::for_type_name("Responsabilidad Civil"), PresetCategory::Generic);
    }

    #[test]
    fn unknown_type_gets_generic_fields() {
        assert_eq!(names(&default_fields("Caución")), vec!["descripcion", "valor_asegurado"]);
    }

    #[test]
    fn every_preset_is_usable_as_is() {
        for type_name in ["Auto", "Moto", "Bicicleta", "Hogar", "Vida", "Salud", "Viaje", "Mascotas", "x"] {
            let fields = default_fields(type_name);
            assert!(!fields.is_empty(), "{type_name}: sem campos");

            let ids: HashSet<Uuid> = fields.iter().map(|f| f.id).collect();
            assert_eq!(ids.len(), fields.len(), "{type_name}: ids repetidos");
            assert!(fields.iter().all(|f| !f.name.trim().is_empty()), "{type_name}: campo sem nome");
        }
    }

    #[test]
    fn each_call_generates_fresh_ids() {
        let a = default_fields("Vida");
        let b = default_fields("Vida");
        assert_ne!(a[0].id, b[0].id);
    }
}
