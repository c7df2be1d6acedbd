//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use rust_decimal::Decimal;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use bazaar_app::{
    auth::{MockAuthService, Principal, Role, UserRecord, UserUuid},
    context::AppContext,
    domain::{
        carts::{
            MockCartsService,
            records::{CartItemRecord, CartRecord},
        },
        checkout::MockCheckoutService,
        orders::{
            MockOrdersService, ORDER_CURRENCY,
            records::{OrderLineRecord, OrderRecord, OrderStatus, OrderUuid},
        },
        payments::MockPaymentsService,
        products::{
            MockProductsService,
            records::{ProductRecord, ProductUuid},
        },
    },
};

use crate::{extensions::*, state::State};

pub(crate) const TEST_USER_UUID: UserUuid = UserUuid::from_uuid(Uuid::nil());
pub(crate) const TEST_ADMIN_UUID: UserUuid = UserUuid::from_uuid(Uuid::from_u128(1));

/// Who the request is made as. Anything but `Anonymous` skips bearer resolution.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Caller {
    Anonymous,
    User,
    Admin,
}

#[salvo::handler]
async fn inject_user(req: &mut Request, depot: &mut Depot, res: &mut Response, ctrl: &mut FlowCtrl) {
    depot.insert_principal(Principal {
        user: TEST_USER_UUID,
        role: Role::User,
    });
    ctrl.call_next(req, depot, res).await;
}

#[salvo::handler]
async fn inject_admin(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_principal(Principal {
        user: TEST_ADMIN_UUID,
        role: Role::Admin,
    });
    ctrl.call_next(req, depot, res).await;
}

/// Mocked services for one test; anything not replaced fails on first use.
#[derive(Debug)]
pub(crate) struct TestServices {
    products: MockProductsService,
    carts: MockCartsService,
    orders: MockOrdersService,
    checkout: MockCheckoutService,
    payments: MockPaymentsService,
    auth: MockAuthService,
}

impl TestServices {
    pub(crate) fn strict() -> Self {
        Self {
            products: strict_products_mock(),
            carts: strict_carts_mock(),
            orders: strict_orders_mock(),
            checkout: strict_checkout_mock(),
            payments: strict_payments_mock(),
            auth: strict_auth_mock(),
        }
    }

    pub(crate) fn with_products(mut self, products: MockProductsService) -> Self {
        self.products = products;
        self
    }

    pub(crate) fn with_carts(mut self, carts: MockCartsService) -> Self {
        self.carts = carts;
        self
    }

    pub(crate) fn with_orders(mut self, orders: MockOrdersService) -> Self {
        self.orders = orders;
        self
    }

    pub(crate) fn with_checkout(mut self, checkout: MockCheckoutService) -> Self {
        self.checkout = checkout;
        self
    }

    pub(crate) fn with_payments(mut self, payments: MockPaymentsService) -> Self {
        self.payments = payments;
        self
    }

    pub(crate) fn with_auth(mut self, auth: MockAuthService) -> Self {
        self.auth = auth;
        self
    }

    pub(crate) fn into_state(self) -> Arc<State> {
        State::from_app_context(AppContext {
            products: Arc::new(self.products),
            carts: Arc::new(self.carts),
            orders: Arc::new(self.orders),
            checkout: Arc::new(self.checkout),
            payments: Arc::new(self.payments),
            auth: Arc::new(self.auth),
        })
    }
}

fn strict_products_mock() -> MockProductsService {
    let mut products = MockProductsService::new();

    products.expect_list_products().never();
    products.expect_get_product_by_slug().never();
    products.expect_get_product().never();
    products.expect_create_product().never();
    products.expect_update_product().never();
    products.expect_delete_product().never();

    products
}

fn strict_carts_mock() -> MockCartsService {
    let mut carts = MockCartsService::new();

    carts.expect_get_cart().never();
    carts.expect_add_item().never();
    carts.expect_remove_item().never();
    carts.expect_clear_cart().never();

    carts
}

fn strict_orders_mock() -> MockOrdersService {
    let mut orders = MockOrdersService::new();

    orders.expect_list_orders().never();
    orders.expect_get_order().never();
    orders.expect_list_all_orders().never();

    orders
}

fn strict_checkout_mock() -> MockCheckoutService {
    let mut checkout = MockCheckoutService::new();

    checkout.expect_create_order_from_cart().never();

    checkout
}

fn strict_payments_mock() -> MockPaymentsService {
    let mut payments = MockPaymentsService::new();

    payments.expect_confirm().never();

    payments
}

fn strict_auth_mock() -> MockAuthService {
    let mut auth = MockAuthService::new();

    auth.expect_signup().never();
    auth.expect_login().never();
    auth.expect_authenticate_bearer().never();
    auth.expect_get_user().never();
    auth.expect_promote_to_admin().never();
    auth.expect_create_admin().never();
    auth.expect_logout().never();

    auth
}

pub(crate) fn make_service(services: TestServices, caller: Caller, route: Router) -> Service {
    let router = Router::new().hoop(inject(services.into_state()));

    let router = match caller {
        Caller::Anonymous => router,
        Caller::User => router.hoop(inject_user),
        Caller::Admin => router.hoop(inject_admin),
    };

    Service::new(router.push(route))
}

pub(crate) fn make_user(uuid: UserUuid, email: &str, role: Role) -> UserRecord {
    UserRecord {
        uuid,
        email: email.to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
        role,
        created_at: Timestamp::UNIX_EPOCH,
    }
}

/// An active product priced at 25.00 with ten units in stock.
pub(crate) fn make_product(catalog_id: i64, slug: &str) -> ProductRecord {
    ProductRecord {
        uuid: ProductUuid::new(),
        catalog_id,
        name: "Blue Mug".to_string(),
        slug: slug.to_string(),
        description: None,
        price: Decimal::new(2500, 2),
        image_url: None,
        inventory: 10,
        category: Some("kitchen".to_string()),
        is_active: true,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_cart(owner: UserUuid, lines: &[(i64, u32)]) -> CartRecord {
    CartRecord {
        owner,
        items: lines
            .iter()
            .map(|&(catalog_id, quantity)| CartItemRecord {
                catalog_id,
                quantity,
            })
            .collect(),
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

/// A single-line order: two units at 25.00.
pub(crate) fn make_order(owner: UserUuid, status: OrderStatus) -> OrderRecord {
    OrderRecord {
        uuid: OrderUuid::new(),
        owner,
        lines: vec![OrderLineRecord {
            product_ref: ProductUuid::new(),
            catalog_id: 7,
            name: "Blue Mug".to_string(),
            unit_price: Decimal::new(2500, 2),
            quantity: 2,
            line_total: Decimal::new(5000, 2),
        }],
        total: Decimal::new(5000, 2),
        currency: ORDER_CURRENCY.to_string(),
        status,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}
