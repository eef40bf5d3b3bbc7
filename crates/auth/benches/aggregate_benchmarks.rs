use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use backoffice_auth::{
    aggregate, AccessContext, MainRole, PermissionMap, PermissionVerb, ResolvedRoles, Resource,
    TenantContext, TenantRole,
};
use backoffice_core::{RoleId, TenantId, UserId};

/// A principal with one main role and one tenant role per tenant, each role
/// granting a rotating slice of the resource/verb space.
fn roles_for(tenants: usize) -> ResolvedRoles {
    let grants = |seed: usize| {
        PermissionMap::from_grants(Resource::ALL.iter().enumerate().map(|(i, r)| {
            let verbs: Vec<PermissionVerb> = PermissionVerb::ALL
                .iter()
                .copied()
                .filter(|v| (i + seed + *v as usize) % 3 != 0)
                .collect();
            (*r, verbs)
        }))
    };

    ResolvedRoles {
        main_roles: vec![MainRole::new(RoleId::new(), "member", grants(0))],
        tenant_roles: (0..tenants)
            .map(|t| {
                TenantRole::new(
                    RoleId::new(),
                    TenantId::new(format!("tenant-{t}")),
                    "member",
                    grants(t + 1),
                )
            })
            .collect(),
    }
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    for tenants in [1usize, 10, 100] {
        let roles = roles_for(tenants);
        group.throughput(Throughput::Elements(tenants as u64 + 1));
        group.bench_with_input(BenchmarkId::from_parameter(tenants), &roles, |b, roles| {
            b.iter(|| aggregate(black_box(roles)))
        });
    }
    group.finish();
}

fn bench_check_any_tenant(c: &mut Criterion) {
    let roles = roles_for(100);
    let ctx = AccessContext::new(UserId::new(), &roles, TenantContext::default());

    c.bench_function("check_permission/any_tenant_miss", |b| {
        b.iter(|| {
            ctx.check_permission(
                black_box(Resource::Activities),
                black_box(PermissionVerb::Delete),
                None,
            )
        })
    });
}

criterion_group!(benches, bench_aggregate, bench_check_any_tenant);
criterion_main!(benches);
