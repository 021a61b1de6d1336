//! API documentation as data.
//!
//! [`ROUTES`] describes every blog endpoint; [`doc`] turns that table into an
//! OpenAPI document. Handlers know nothing about either.

use utoipa::openapi::path::{HttpMethod, OperationBuilder, ParameterBuilder, ParameterIn, PathItem};
use utoipa::openapi::request_body::RequestBodyBuilder;
use utoipa::openapi::server::Server;
use utoipa::openapi::{InfoBuilder, OpenApi, OpenApiBuilder, PathsBuilder, Required, ResponseBuilder};

pub struct RouteDoc {
    pub method: HttpMethod,
    pub path: &'static str,
    pub tag: &'static str,
    pub summary: &'static str,
    pub params: &'static [ParamDoc],
    pub body: Option<&'static str>,
    pub responses: &'static [(&'static str, &'static str)],
}

pub struct ParamDoc {
    pub name: &'static str,
    pub location: ParameterIn,
    pub required: bool,
    pub description: &'static str,
}

const POSTS: &str = "Publicaciones";
const COMMENTS: &str = "Comentarios";

const POST_ID: ParamDoc = ParamDoc {
    name: "id",
    location: ParameterIn::Path,
    required: true,
    description: "ID de la publicación.",
};

const COMMENT_ID: ParamDoc = ParamDoc {
    name: "comentarioId",
    location: ParameterIn::Path,
    required: true,
    description: "ID del comentario.",
};

pub const ROUTES: &[RouteDoc] = &[
    RouteDoc {
        method: HttpMethod::Post,
        path: "/agregarPublicacion",
        tag: POSTS,
        summary: "Agrega una nueva publicación.",
        params: &[],
        body: Some("{ title, description, course, publishedAt? }"),
        responses: &[
            ("201", "Publicación creada."),
            ("400", "Datos inválidos."),
            ("500", "Error interno del servidor."),
        ],
    },
    RouteDoc {
        method: HttpMethod::Get,
        path: "/listarPublicaciones",
        tag: POSTS,
        summary: "Lista todas las publicaciones con sus comentarios.",
        params: &[ParamDoc {
            name: "incluirComentarios",
            location: ParameterIn::Query,
            required: false,
            description: "false para omitir los comentarios (por defecto true).",
        }],
        body: None,
        responses: &[
            ("200", "Lista de publicaciones."),
            ("500", "Error interno del servidor."),
        ],
    },
    RouteDoc {
        method: HttpMethod::Get,
        path: "/listarPublicaciones/{id}",
        tag: POSTS,
        summary: "Obtiene una publicación con sus comentarios.",
        params: &[POST_ID],
        body: None,
        responses: &[
            ("200", "Publicación encontrada."),
            ("404", "La publicación no existe."),
        ],
    },
    RouteDoc {
        method: HttpMethod::Get,
        path: "/filtrarPorCurso",
        tag: POSTS,
        summary: "Filtra publicaciones por curso.",
        params: &[ParamDoc {
            name: "curso",
            location: ParameterIn::Query,
            required: true,
            description: "Practica-Supervisada, Tecnologia III o Taller III.",
        }],
        body: None,
        responses: &[
            ("200", "Publicaciones del curso."),
            ("400", "Falta el parámetro curso."),
        ],
    },
    RouteDoc {
        method: HttpMethod::Get,
        path: "/filtrarPorTitulo",
        tag: POSTS,
        summary: "Filtra publicaciones cuyo título contiene el texto dado.",
        params: &[ParamDoc {
            name: "titulo",
            location: ParameterIn::Query,
            required: true,
            description: "Texto a buscar, sin distinguir mayúsculas.",
        }],
        body: None,
        responses: &[
            ("200", "Publicaciones coincidentes."),
            ("400", "Falta el parámetro titulo."),
        ],
    },
    RouteDoc {
        method: HttpMethod::Get,
        path: "/filtrarPorFechas",
        tag: POSTS,
        summary: "Filtra publicaciones por rango de fechas de publicación.",
        params: &[
            ParamDoc {
                name: "fechaInicio",
                location: ParameterIn::Query,
                required: true,
                description: "Primer día incluido, YYYY-MM-DD.",
            },
            ParamDoc {
                name: "fechaFin",
                location: ParameterIn::Query,
                required: true,
                description: "Último día incluido, YYYY-MM-DD.",
            },
        ],
        body: None,
        responses: &[
            ("200", "Publicaciones en el rango."),
            ("400", "Fechas ausentes o inválidas."),
        ],
    },
    RouteDoc {
        method: HttpMethod::Put,
        path: "/editarPublicacion/{id}",
        tag: POSTS,
        summary: "Edita el título y la descripción de una publicación.",
        params: &[POST_ID],
        body: Some("{ title, description }"),
        responses: &[
            ("200", "Publicación editada."),
            ("400", "Datos inválidos."),
            ("404", "La publicación no existe."),
        ],
    },
    RouteDoc {
        method: HttpMethod::Delete,
        path: "/eliminarPublicacion/{id}",
        tag: POSTS,
        summary: "Elimina una publicación y sus comentarios.",
        params: &[POST_ID],
        body: None,
        responses: &[
            ("200", "Publicación eliminada."),
            ("404", "La publicación no existe."),
        ],
    },
    RouteDoc {
        method: HttpMethod::Post,
        path: "/agregarcomentarios/{id}",
        tag: COMMENTS,
        summary: "Agrega un comentario a una publicación.",
        params: &[POST_ID],
        body: Some("{ usuario, contenidoComentario }"),
        responses: &[
            ("201", "Comentario agregado."),
            ("400", "Datos inválidos."),
            ("404", "La publicación no existe."),
            ("500", "Error interno del servidor."),
        ],
    },
    RouteDoc {
        method: HttpMethod::Put,
        path: "/editarcomentarios/{comentarioId}",
        tag: COMMENTS,
        summary: "Edita el contenido de un comentario.",
        params: &[COMMENT_ID],
        body: Some("{ contenidoComentario }"),
        responses: &[
            ("200", "Comentario editado."),
            ("400", "Falta el contenido."),
            ("404", "El comentario no existe."),
        ],
    },
    RouteDoc {
        method: HttpMethod::Delete,
        path: "/eliminarcomentarios/{comentarioId}",
        tag: COMMENTS,
        summary: "Elimina un comentario y lo quita de su publicación.",
        params: &[COMMENT_ID],
        body: None,
        responses: &[
            ("200", "Comentario eliminado."),
            ("404", "El comentario no existe."),
        ],
    },
    RouteDoc {
        method: HttpMethod::Get,
        path: "/comentariosPublicacion/{id}",
        tag: COMMENTS,
        summary: "Lista los comentarios de una publicación en orden de creación.",
        params: &[POST_ID],
        body: None,
        responses: &[
            ("200", "Comentarios de la publicación."),
            ("404", "La publicación no existe."),
        ],
    },
];

/// Builds the OpenAPI document for routes served under `base_path`.
pub fn doc(base_path: &str) -> OpenApi {
    let mut paths = PathsBuilder::new();
    for route in ROUTES {
        let item = PathItem::new(route.method.clone(), operation(route).build());
        paths = paths.path(route.path, item);
    }

    let server = if base_path.is_empty() { "/" } else { base_path };

    OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title("Blog de aprendizaje")
                .version(env!("CARGO_PKG_VERSION"))
                .description(Some("Publicaciones por curso y sus comentarios."))
                .build(),
        )
        .servers(Some([Server::new(server)]))
        .paths(paths.build())
        .build()
}

fn operation(route: &RouteDoc) -> OperationBuilder {
    let mut operation = OperationBuilder::new()
        .tag(route.tag)
        .summary(Some(route.summary));

    for param in route.params {
        operation = operation.parameter(
            ParameterBuilder::new()
                .name(param.name)
                .parameter_in(param.location.clone())
                .required(if param.required {
                    Required::True
                } else {
                    Required::False
                })
                .description(Some(param.description))
                .build(),
        );
    }

    if let Some(body) = route.body {
        operation = operation.request_body(Some(
            RequestBodyBuilder::new()
                .description(Some(format!("JSON: {}", body)))
                .required(Some(Required::True))
                .build(),
        ));
    }

    for (code, description) in route.responses {
        operation = operation.response(
            *code,
            ResponseBuilder::new().description(*description).build(),
        );
    }

    operation
}
