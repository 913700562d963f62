/// Hard upper bound for any listing `LIMIT`/page size to protect DB and memory usage.
pub const MAX_LISTING_ELEMENTS: i64 = 200;

// User-facing response messages. The public API speaks Spanish.
pub const WELCOME_MESSAGE: &str = "Bienvenido a la API de recursos";
pub const INTERNAL_ERROR: &str = "Error interno del servidor";

pub const RESOURCE_NOT_FOUND: &str = "Recurso no encontrado";
pub const RESOURCE_DELETED: &str = "Recurso eliminado exitosamente";
pub const DUPLICATE_TITLE: &str = "Ya existe un recurso con este título";

pub const TAG_NOT_FOUND: &str = "Tag no encontrado";
pub const TAG_DELETED: &str = "Tag eliminado exitosamente";

pub const CATEGORY_NOT_FOUND: &str = "Categoría no encontrada";
