//! App Router

use salvo::Router;

use crate::{
    auth::{self, middleware::require_admin},
    carts, checkout, orders, payments, products,
};

pub(crate) fn app_router() -> Router {
    Router::new()
        .push(
            Router::with_path("auth")
                .push(Router::with_path("signup").post(auth::signup::handler))
                .push(Router::with_path("login").post(auth::login::handler))
                .push(
                    Router::new()
                        .hoop(auth::middleware::handler)
                        .push(Router::with_path("me").get(auth::me::handler))
                        .push(Router::with_path("logout").post(auth::logout::handler))
                        .push(
                            Router::with_path("promote-to-admin")
                                .hoop(require_admin)
                                .post(auth::promote::handler),
                        ),
                ),
        )
        .push(
            Router::with_path("products")
                .get(products::index::handler)
                .push(Router::with_path("{slug}").get(products::get::handler)),
        )
        .push(
            Router::with_path("admin/products")
                .hoop(auth::middleware::handler)
                .hoop(require_admin)
                .post(products::create::handler)
                .push(
                    Router::with_path("{uuid}")
                        .patch(products::update::handler)
                        .delete(products::delete::handler),
                ),
        )
        .push(
            Router::new()
                .hoop(auth::middleware::handler)
                .push(
                    Router::with_path("cart")
                        .get(carts::get::handler)
                        .delete(carts::clear::handler)
                        .push(Router::with_path("add").post(carts::add::handler))
                        .push(Router::with_path("remove").post(carts::remove::handler)),
                )
                .push(
                    Router::with_path("checkout/create-order")
                        .post(checkout::create_order::handler),
                )
                .push(
                    Router::with_path("orders")
                        .get(orders::index::handler)
                        .push(
                            Router::with_path("admin/all")
                                .hoop(require_admin)
                                .get(orders::all::handler),
                        )
                        .push(Router::with_path("{uuid}").get(orders::get::handler)),
                )
                .push(Router::with_path("payments/confirm").post(payments::confirm::handler)),
        )
}
