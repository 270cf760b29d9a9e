/// A fixed syllabus subject used to parametrize question generation.
pub struct Topic {
    pub id: &'static str,
    pub name: &'static str,
    pub syllabus: &'static str,
}

static TOPICS: [Topic; 3] = [
    Topic {
        id: "1",
        name: "Constitución Española",
        syllabus: "La Constitución española: estructura y contenido. Derechos y deberes fundamentales.",
    },
    Topic {
        id: "16",
        name: "Sistema Público de Servicios Sociales",
        syllabus: "El sistema público de protección de servicios sociales en el marco de las políticas de bienestar social.",
    },
    Topic {
        id: "21",
        name: "Ley de Dependencia",
        syllabus: "La Ley 39/2006, de 14 de diciembre, de Promoción de la Autonomía Personal y Atención a las personas en situación de dependencia.",
    },
];

static DEFAULT_TOPIC: Topic = Topic {
    id: "16",
    name: "Servicios Sociales",
    syllabus: "Contenido general",
};

/// Unknown ids fall back to the generic social-services topic rather than
/// failing the flow.
pub fn lookup(id: &str) -> &'static Topic {
    TOPICS.iter().find(|t| t.id == id).unwrap_or(&DEFAULT_TOPIC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_catalog_topics() {
        assert_eq!(lookup("16").name, "Sistema Público de Servicios Sociales");
        assert_eq!(lookup("21").name, "Ley de Dependencia");
    }

    #[test]
    fn lookup_falls_back_on_unknown_id() {
        assert_eq!(lookup("99").name, "Servicios Sociales");
    }
}
